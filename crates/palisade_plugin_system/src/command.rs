//! Command parsing and handoff to the host's command table.

use crate::descriptor::{Aliases, PluginDescriptor};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runtime command object built from a manifest's command table.
///
/// Execution lives with the host; this crate only builds the objects and
/// hands them over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub aliases: Vec<String>,
}

/// External command-table collaborator.
///
/// Implemented by the host's command registry/dispatcher; receives each
/// enabled plugin's commands under that plugin's namespace.
pub trait CommandMap: Send + Sync {
    fn register_all(&self, namespace: &str, commands: Vec<Command>);
}

/// Binds plugin-declared command descriptors into runtime [`Command`]s and
/// registers them with the host's [`CommandMap`].
pub struct CommandRegistrar {
    command_map: Arc<dyn CommandMap>,
}

impl CommandRegistrar {
    pub fn new(command_map: Arc<dyn CommandMap>) -> Self {
        Self { command_map }
    }

    /// Parse and register every well-formed command the descriptor declares,
    /// under the plugin's name as namespace. Nothing is registered when the
    /// descriptor declares no usable commands.
    pub fn register_plugin_commands(&self, descriptor: &PluginDescriptor) {
        let commands = Self::parse_commands(descriptor);
        if commands.is_empty() {
            return;
        }
        debug!(
            "Registering {} commands under namespace {}",
            commands.len(),
            descriptor.name
        );
        self.command_map.register_all(&descriptor.name, commands);
    }

    /// Build [`Command`] objects from a descriptor's command table.
    ///
    /// Command names containing the namespace separator `:` are reserved and
    /// skipped, as are namespaced aliases. Aliases accept both the single
    /// string and the list form.
    pub fn parse_commands(descriptor: &PluginDescriptor) -> Vec<Command> {
        let mut commands = Vec::new();
        for (name, spec) in &descriptor.commands {
            if name.contains(':') {
                warn!(
                    "Skipping command {} of plugin {}: namespaced names are reserved",
                    name, descriptor.name
                );
                continue;
            }

            let aliases = match &spec.aliases {
                Aliases::One(alias) if !alias.contains(':') && !alias.is_empty() => {
                    vec![alias.clone()]
                }
                Aliases::One(_) => Vec::new(),
                Aliases::Many(list) => list
                    .iter()
                    .filter(|alias| !alias.contains(':'))
                    .cloned()
                    .collect(),
            };

            commands.push(Command {
                name: name.clone(),
                description: spec.description.clone(),
                usage: spec.usage.clone(),
                aliases,
            });
        }
        commands
    }
}
