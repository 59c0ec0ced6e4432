//! Plugin-system configuration.

use crate::API_VERSION;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default plugin directory
fn default_plugin_dir() -> PathBuf {
    PathBuf::from("plugins")
}

/// Default API version offered to plugins
fn default_api_version() -> i32 {
    API_VERSION
}

/// Plugin configuration settings.
///
/// Controls where manifests and plugin data directories live and which API
/// version code the host offers during load filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Directory containing plugin manifests and per-plugin data folders
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: PathBuf,
    /// API version code declared to plugins (overridable for testing against
    /// older manifests)
    #[serde(default = "default_api_version")]
    pub api_version: i32,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            plugin_dir: default_plugin_dir(),
            api_version: default_api_version(),
        }
    }
}
