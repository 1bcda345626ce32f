//! Tuning knobs for the diff pass and tree restore.
//!
//! Read from `tabtree.toml`; every field has a default so a partial or
//! empty file is valid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "tabtree.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TreeConfig {
    #[serde(default)]
    pub diff: DiffSettings,
    #[serde(default)]
    pub restore: RestoreSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffSettings {
    /// Longest chain of knot base references a diff pass may build before
    /// falling back to an inline knot.
    #[serde(default = "default_max_base_chain")]
    pub max_base_chain: usize,
    /// When false, dirty nodes always get inline knots.
    #[serde(default = "default_true")]
    pub prefer_delta: bool,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            max_base_chain: default_max_base_chain(),
            prefer_delta: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestoreSettings {
    /// Text of the note substituted for a node that closes a cycle.
    #[serde(default = "default_cycle_note")]
    pub cycle_note: String,
    /// Text of the note substituted for a missing knot or entry.
    #[serde(default = "default_missing_note")]
    pub missing_note: String,
    /// Deepest level a restore descends to. Children below it are replaced
    /// by a single note.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_depth_note")]
    pub depth_note: String,
}

impl Default for RestoreSettings {
    fn default() -> Self {
        Self {
            cycle_note: default_cycle_note(),
            missing_note: default_missing_note(),
            max_depth: default_max_depth(),
            depth_note: default_depth_note(),
        }
    }
}

fn default_max_base_chain() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_cycle_note() -> String {
    "#ERROR: cycle in saved tree at".to_string()
}

fn default_missing_note() -> String {
    "#ERROR: missing saved data for".to_string()
}

fn default_max_depth() -> usize {
    128
}

fn default_depth_note() -> String {
    "#ERROR: saved tree too deep at".to_string()
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TreeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
