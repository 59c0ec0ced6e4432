//! The composition root: plugin lifecycle plus the public event API.

use crate::command::{CommandMap, CommandRegistrar};
use crate::config::PluginSettings;
use crate::descriptor::PluginDescriptor;
use crate::error::PluginError;
use crate::events::{PluginDisableEvent, PluginEnableEvent, PLUGIN_DISABLE, PLUGIN_ENABLE};
use crate::loader::PluginLoader;
use crate::plugin::{Plugin, PluginHandle};
use crate::registry::PluginRegistry;
use palisade_event_system::{
    Event, EventDispatcher, EventExecutor, EventPriority, EventType, HandlerList, Listener,
    PluginOwner,
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// Owns the registry, loader, dispatcher, and command registrar, and exposes
/// the runtime's single public API surface.
///
/// Every method works through `&self`; all state sits behind interior
/// mutability so that listeners invoked during a dispatch may re-enter the
/// manager (fire further events, register listeners, even disable plugins).
pub struct PluginManager {
    settings: PluginSettings,
    registry: PluginRegistry,
    loader: PluginLoader,
    dispatcher: Arc<EventDispatcher>,
    commands: CommandRegistrar,
    /// Plugins handed over by discovery, awaiting `load_plugins`.
    pre_plugins: Mutex<Vec<Box<dyn Plugin>>>,
}

impl PluginManager {
    pub fn new(settings: PluginSettings, command_map: Arc<dyn CommandMap>) -> Self {
        let dispatcher = Arc::new(EventDispatcher::new());
        dispatcher.register_event_type(PLUGIN_ENABLE);
        dispatcher.register_event_type(PLUGIN_DISABLE);

        Self {
            loader: PluginLoader::new(settings.api_version),
            settings,
            registry: PluginRegistry::new(),
            dispatcher,
            commands: CommandRegistrar::new(command_map),
            pre_plugins: Mutex::new(Vec::new()),
        }
    }

    /// The shared dispatcher, for event-defining modules to register their
    /// event types on.
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Hand over a discovered plugin for the next `load_plugins` batch.
    pub fn register_plugin(&self, plugin: Box<dyn Plugin>) {
        self.pre_plugins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(plugin);
    }

    /// Load every registered plugin in dependency order.
    ///
    /// Plugins whose manifest fails to parse, whose hard dependencies cannot
    /// be satisfied, or who are caught in a dependency cycle are excluded
    /// from the batch and reported only through logs; the rest load normally.
    /// Returns the loaded handles in load order.
    pub fn load_plugins(&self) -> Vec<Arc<PluginHandle>> {
        let pre_plugins = std::mem::take(
            &mut *self
                .pre_plugins
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let mut discovered = Vec::with_capacity(pre_plugins.len());
        for plugin in pre_plugins {
            let path = self.settings.plugin_dir.join(plugin.manifest());
            match PluginDescriptor::load(&path) {
                Ok(descriptor) => discovered.push((plugin, descriptor)),
                Err(e) => warn!("Skipping plugin with unusable descriptor: {}", e),
            }
        }

        let ordered = self.loader.resolve(discovered);
        let mut loaded = Vec::with_capacity(ordered.len());
        for (plugin, descriptor) in ordered {
            let data_dir = self.settings.plugin_dir.join(&descriptor.name);
            let handle = Arc::new(PluginHandle::new(plugin, descriptor, data_dir));
            info!(
                "Loaded plugin {} v{}",
                handle.name(),
                handle.descriptor().version
            );
            self.registry.insert(handle.clone());
            loaded.push(handle);
        }
        loaded
    }

    /// Find a loaded plugin by name (spaces normalize to underscores).
    pub fn plugin(&self, name: &str) -> Result<Arc<PluginHandle>, PluginError> {
        self.registry.lookup(name)
    }

    /// All loaded plugins, in load order.
    pub fn plugins(&self) -> Vec<Arc<PluginHandle>> {
        self.registry.all()
    }

    /// Whether the named plugin is loaded and enabled.
    pub fn is_plugin_enabled(&self, name: &str) -> bool {
        self.registry
            .lookup(name)
            .map(|handle| handle.is_enabled())
            .unwrap_or(false)
    }

    /// Enable a plugin: register its declared commands, flip it live, let it
    /// register its listeners, announce it, and bake all handler lists.
    ///
    /// Idempotent; enabling an enabled plugin does nothing.
    pub fn enable_plugin(&self, handle: &Arc<PluginHandle>) {
        if handle.is_enabled() {
            return;
        }
        info!("Enabling plugin {}", handle.name());

        self.commands.register_plugin_commands(handle.descriptor());
        handle.set_enabled(true);
        handle.plugin().on_enable(self, handle);

        let mut event = PluginEnableEvent::new(handle.clone());
        self.call_event(&mut event);

        self.dispatcher.bake_all();
    }

    /// Disable a plugin: announce it, run its disable hook, take it offline,
    /// and revoke every listener registration it owns.
    ///
    /// Idempotent; disabling a disabled plugin does nothing.
    pub fn disable_plugin(&self, handle: &Arc<PluginHandle>) {
        if !handle.is_enabled() {
            return;
        }
        info!("Disabling plugin {}", handle.name());

        // Announced while the plugin is still enabled, so its own listeners
        // receive the notification.
        let mut event = PluginDisableEvent::new(handle.clone());
        self.call_event(&mut event);

        handle.plugin().on_disable(self, handle);
        handle.set_enabled(false);
        self.dispatcher.unregister_plugin(handle.name());
    }

    /// Disable every plugin in reverse load order (last loaded first).
    pub fn disable_all(&self) {
        for handle in self.registry.all().iter().rev() {
            self.disable_plugin(handle);
        }
    }

    /// Disable everything, release ownership of every plugin, and tear down
    /// every handler list.
    pub fn clear(&self) {
        self.disable_all();
        self.registry.clear();
        self.dispatcher.clear();
        // Lifecycle notifications stay routable after a clear.
        self.dispatcher.register_event_type(PLUGIN_ENABLE);
        self.dispatcher.register_event_type(PLUGIN_DISABLE);
    }

    /// Dispatch an event to every interested listener, in priority order.
    pub fn call_event(&self, event: &mut dyn Event) {
        self.dispatcher.dispatch(event);
    }

    /// Register an event listener owned by a plugin.
    ///
    /// Silently rejected if the plugin is not enabled, since plugins may
    /// attempt registration mid-teardown.
    pub fn register_event(
        &self,
        event_type: EventType,
        listener: Arc<dyn Listener>,
        executor: EventExecutor,
        plugin: &Arc<PluginHandle>,
        priority: EventPriority,
        ignore_cancelled: bool,
    ) {
        self.dispatcher.register_listener(
            event_type,
            listener,
            executor,
            plugin.clone() as Arc<dyn PluginOwner>,
            priority,
            ignore_cancelled,
        );
    }

    /// The handler list for an event type, or `None` for an unknown tag.
    pub fn get_event_listeners(&self, event_type: EventType) -> Option<Arc<HandlerList>> {
        self.dispatcher.handler_list(event_type)
    }
}
