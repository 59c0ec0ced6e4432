//! Error types for plugin loading and lookup.

use std::path::PathBuf;

/// Errors surfaced by the plugin system.
///
/// Per-plugin load failures (malformed manifests, missing dependencies,
/// cycles) are not represented here; those plugins are logged and excluded
/// from the load batch instead of failing the whole operation.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// No loaded plugin matches the (normalized) name
    #[error("plugin not found: {0}")]
    NotFound(String),
    /// Manifest file could not be read
    #[error("failed to read descriptor {}: {source}", path.display())]
    DescriptorIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Manifest file is not a valid descriptor
    #[error("failed to parse descriptor {}: {source}", path.display())]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
