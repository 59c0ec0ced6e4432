//! Plugin manifest parsing.
//!
//! A descriptor is a JSON manifest sitting next to the plugin's data
//! directory. It is immutable after parse; everything the loader and the
//! command registrar need comes from here.

use crate::error::PluginError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parsed plugin manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin name; doubles as its command namespace and data directory name
    pub name: String,
    /// Human-readable version string
    #[serde(default)]
    pub version: String,
    /// Host API version codes this plugin supports
    #[serde(rename = "api-versions", default)]
    pub api_versions: Vec<i32>,
    /// Hard dependencies: these plugins must load before this one
    #[serde(default)]
    pub depend: Vec<String>,
    /// Soft dependencies: preferred but non-blocking load-order hints
    #[serde(default)]
    pub softdepend: Vec<String>,
    /// Inverse soft dependencies: plugins this one wants to load before
    #[serde(default)]
    pub loadbefore: Vec<String>,
    /// Declared commands, keyed by command name
    #[serde(default)]
    pub commands: BTreeMap<String, CommandSpec>,
}

impl PluginDescriptor {
    /// Parse a descriptor from a JSON manifest file.
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let raw = fs::read_to_string(path).map_err(|source| PluginError::DescriptorIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| PluginError::DescriptorParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether this plugin declares support for the given host API version.
    pub fn supports_api(&self, api_version: i32) -> bool {
        self.api_versions.contains(&api_version)
    }
}

/// One declared command inside a manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandSpec {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub aliases: Aliases,
}

/// Alias declaration: manifests may use a single string or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Aliases {
    One(String),
    Many(Vec<String>),
}

impl Default for Aliases {
    fn default() -> Self {
        Aliases::Many(Vec::new())
    }
}
