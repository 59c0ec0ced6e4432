//! Ownership and lookup of loaded plugins.

use crate::error::PluginError;
use crate::plugin::PluginHandle;
use dashmap::DashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Normalized lookup key: spaces become underscores.
fn normalize(name: &str) -> String {
    name.replace(' ', "_")
}

/// Tracks loaded plugins in load order and by normalized name.
///
/// The registry is the sole owner of plugin lifetime: handles live here for
/// as long as the plugin is loaded, and [`clear`](Self::clear) drops them by
/// emptying the owning containers.
pub struct PluginRegistry {
    plugins: RwLock<Vec<Arc<PluginHandle>>>,
    by_name: DashMap<String, Arc<PluginHandle>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
            by_name: DashMap::new(),
        }
    }

    /// Track a freshly loaded plugin. Handles are appended in load order.
    pub fn insert(&self, handle: Arc<PluginHandle>) {
        self.by_name.insert(normalize(handle.name()), handle.clone());
        self.plugins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Find a plugin by name, normalizing spaces to underscores first.
    pub fn lookup(&self, name: &str) -> Result<Arc<PluginHandle>, PluginError> {
        self.by_name
            .get(&normalize(name))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    /// All loaded plugins, in load order.
    pub fn all(&self) -> Vec<Arc<PluginHandle>> {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Release ownership of every plugin and empty the lookup table.
    pub fn clear(&self) {
        self.plugins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.by_name.clear();
    }

    pub fn len(&self) -> usize {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
