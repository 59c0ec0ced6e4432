//! Minimal host wiring: one plugin with a manifest on disk, loaded, enabled,
//! receiving a game event, and shut down again.
//!
//! Run with: `cargo run --example host_loop`

use palisade_event_system::{typed_executor, Cancellable, Event, EventPriority, EventType, Listener};
use palisade_plugin_system::{
    Command, CommandMap, Plugin, PluginHandle, PluginManager, PluginSettings, API_VERSION,
};
use serde_json::json;
use std::any::Any;
use std::fs;
use std::sync::Arc;
use tracing::info;

const PLAYER_CHAT: EventType = EventType::new("player_chat");

#[derive(Debug)]
struct PlayerChatEvent {
    player: String,
    message: String,
    cancelled: bool,
}

impl Event for PlayerChatEvent {
    fn event_type(&self) -> EventType {
        PLAYER_CHAT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
        Some(self)
    }
}

impl Cancellable for PlayerChatEvent {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

/// Listener state for the greeter plugin.
struct ChatFilter;

impl Listener for ChatFilter {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A plugin that censors chat messages containing "creeper".
struct GreeterPlugin;

impl Plugin for GreeterPlugin {
    fn manifest(&self) -> &str {
        "greeter.json"
    }

    fn on_enable(&self, manager: &PluginManager, handle: &Arc<PluginHandle>) {
        manager.register_event(
            PLAYER_CHAT,
            Arc::new(ChatFilter),
            typed_executor(|_: &ChatFilter, event: &mut PlayerChatEvent| {
                if event.message.contains("creeper") {
                    event.set_cancelled(true);
                }
                Ok(())
            }),
            handle,
            EventPriority::Low,
            false,
        );
    }
}

/// Command table that just logs what plugins register.
struct LoggingCommandMap;

impl CommandMap for LoggingCommandMap {
    fn register_all(&self, namespace: &str, commands: Vec<Command>) {
        for command in &commands {
            info!("Command registered: /{} (namespace {})", command.name, namespace);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let plugin_dir = std::env::temp_dir().join("palisade_host_loop");
    fs::create_dir_all(&plugin_dir)?;
    fs::write(
        plugin_dir.join("greeter.json"),
        json!({
            "name": "greeter",
            "version": "0.1.0",
            "api-versions": [API_VERSION],
            "commands": {
                "greet": {"description": "Greet a player", "usage": "/greet <name>"}
            }
        })
        .to_string(),
    )?;

    let manager = PluginManager::new(
        PluginSettings {
            plugin_dir,
            api_version: API_VERSION,
        },
        Arc::new(LoggingCommandMap),
    );
    manager.dispatcher().register_event_type(PLAYER_CHAT);

    manager.register_plugin(Box::new(GreeterPlugin));
    for handle in &manager.load_plugins() {
        manager.enable_plugin(handle);
    }

    let mut event = PlayerChatEvent {
        player: "steve".to_string(),
        message: "there is a creeper behind you".to_string(),
        cancelled: false,
    };
    manager.call_event(&mut event);
    info!(
        "Chat from {} cancelled by plugins: {}",
        event.player,
        event.is_cancelled()
    );

    manager.clear();
    Ok(())
}
