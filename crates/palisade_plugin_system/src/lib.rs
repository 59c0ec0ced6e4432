//! # Palisade Plugin System
//!
//! Plugin hosting for the Palisade game server: manifest parsing,
//! dependency-order loading, lifecycle management, and command registration,
//! layered over the [`palisade_event_system`] event bus.
//!
//! ## Architecture
//!
//! - **[`PluginDescriptor`]**: parsed JSON manifest (name, version, declared
//!   API versions, hard/soft dependencies, load-before hints, commands).
//! - **[`PluginLoader`]**: orders discovered plugins into a valid load
//!   sequence and drops unsatisfiable ones.
//! - **[`PluginRegistry`]**: owns loaded plugins and their name lookup.
//! - **[`CommandRegistrar`]**: turns declared command tables into runtime
//!   [`Command`] objects for the host's [`CommandMap`].
//! - **[`PluginManager`]**: composition root and the single public API
//!   surface.
//!
//! ## Lifecycle
//!
//! Discovery hands the manager `(plugin, manifest)` pairs via
//! [`PluginManager::register_plugin`]. [`PluginManager::load_plugins`]
//! resolves the dependency order and attaches each plugin's descriptor and
//! data directory. Enabling a plugin registers its declared commands, flips
//! it live, lets it register event listeners, and announces it through a
//! [`PluginEnableEvent`] on the shared dispatcher. Disabling announces first
//! (while the plugin can still hear it), then revokes every listener
//! registration the plugin owns.

pub mod command;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod loader;
pub mod manager;
pub mod plugin;
pub mod registry;

pub use command::{Command, CommandMap, CommandRegistrar};
pub use config::PluginSettings;
pub use descriptor::{Aliases, CommandSpec, PluginDescriptor};
pub use error::PluginError;
pub use events::{PluginDisableEvent, PluginEnableEvent, PLUGIN_DISABLE, PLUGIN_ENABLE};
pub use loader::PluginLoader;
pub use manager::PluginManager;
pub use plugin::{Plugin, PluginHandle};
pub use registry::PluginRegistry;

/// API version code the host offers to plugins.
///
/// A plugin loads only if its manifest's `api-versions` list contains this
/// value.
pub const API_VERSION: i32 = 2;

/// Plugin names the loader refuses regardless of manifest contents.
pub const RESERVED_NAMES: [&str; 3] = ["palisade", "minecraft", "mojang"];

/// Result type used throughout the plugin system.
pub type Result<T> = std::result::Result<T, PluginError>;
