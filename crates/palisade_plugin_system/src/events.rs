//! Lifecycle notification events, dispatched through the same event system
//! the plugins use.

use crate::plugin::PluginHandle;
use palisade_event_system::{Event, EventType};
use std::any::Any;
use std::sync::Arc;

/// Routing tag for [`PluginEnableEvent`].
pub const PLUGIN_ENABLE: EventType = EventType::new("plugin_enable");

/// Routing tag for [`PluginDisableEvent`].
pub const PLUGIN_DISABLE: EventType = EventType::new("plugin_disable");

/// Raised after a plugin finishes enabling.
#[derive(Debug)]
pub struct PluginEnableEvent {
    plugin: Arc<PluginHandle>,
}

impl PluginEnableEvent {
    pub fn new(plugin: Arc<PluginHandle>) -> Self {
        Self { plugin }
    }

    pub fn plugin(&self) -> &Arc<PluginHandle> {
        &self.plugin
    }
}

impl Event for PluginEnableEvent {
    fn event_type(&self) -> EventType {
        PLUGIN_ENABLE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Raised while a plugin is being disabled, before its registrations are
/// revoked, so the plugin's own listeners still receive it.
#[derive(Debug)]
pub struct PluginDisableEvent {
    plugin: Arc<PluginHandle>,
}

impl PluginDisableEvent {
    pub fn new(plugin: Arc<PluginHandle>) -> Self {
        Self { plugin }
    }

    pub fn plugin(&self) -> &Arc<PluginHandle> {
        &self.plugin
    }
}

impl Event for PluginDisableEvent {
    fn event_type(&self) -> EventType {
        PLUGIN_DISABLE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
