//! Configuration for reload watcher behavior.

use serde::{Deserialize, Serialize};

/// Configuration for reload watcher behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Debounce delay to collapse rapid editor saves into one rebuild.
    pub debounce_delay_ms: u64,
    /// Source file extensions that trigger a rebuild.
    pub extensions: Vec<String>,
    /// Whether to monitor hidden files and directories.
    pub include_hidden: bool,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            debounce_delay_ms: 500,
            extensions: ["rs", "toml", "html", "css", "js", "json"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            include_hidden: false,
        }
    }
}
