//! The plugin behavior trait and the handle the registry owns.

use crate::descriptor::PluginDescriptor;
use crate::manager::PluginManager;
use palisade_event_system::PluginOwner;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Behavior contract implemented by each hosted plugin.
///
/// Plugins arrive from an external discovery collaborator as trait objects;
/// the runtime attaches their descriptor and data directory at load time and
/// drives the lifecycle hooks around enable/disable.
pub trait Plugin: Send + Sync + 'static {
    /// File name of this plugin's JSON manifest, relative to the configured
    /// plugin directory.
    fn manifest(&self) -> &str;

    /// Called when the plugin goes live, after its enabled flag flips and
    /// before the [`PluginEnableEvent`](crate::events::PluginEnableEvent)
    /// notification fires. Event listeners registered here are accepted
    /// because the plugin is already enabled.
    fn on_enable(&self, manager: &PluginManager, handle: &Arc<PluginHandle>) {
        let _ = (manager, handle);
    }

    /// Called while the plugin is being disabled, after the
    /// [`PluginDisableEvent`](crate::events::PluginDisableEvent) notification
    /// and before its listener registrations are revoked.
    fn on_disable(&self, manager: &PluginManager, handle: &Arc<PluginHandle>) {
        let _ = (manager, handle);
    }
}

/// A loaded plugin: the trait object plus everything the runtime attached
/// at load time.
///
/// The handle is the registration owner the event system sees; its enabled
/// flag is consulted live on every dispatch. A plugin's listeners and
/// commands exist only while the flag is set, and disabling revokes both.
pub struct PluginHandle {
    plugin: Box<dyn Plugin>,
    descriptor: PluginDescriptor,
    data_dir: PathBuf,
    enabled: AtomicBool,
}

impl PluginHandle {
    pub(crate) fn new(plugin: Box<dyn Plugin>, descriptor: PluginDescriptor, data_dir: PathBuf) -> Self {
        Self {
            plugin,
            descriptor,
            data_dir,
            enabled: AtomicBool::new(false),
        }
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// The plugin's declared name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Directory reserved for this plugin's own data files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }
}

impl PluginOwner for PluginHandle {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn is_enabled(&self) -> bool {
        PluginHandle::is_enabled(self)
    }
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("name", &self.descriptor.name)
            .field("version", &self.descriptor.version)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
