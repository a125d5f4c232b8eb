//! Storage backend configuration.

use serde::Deserialize;
use std::time::Duration;

/// Which key-value backend holds the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Durable embedded database file.
    #[default]
    Redb,
    /// Process memory only; everything is lost on exit.
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Path to the redb database file.
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Per-request store timeout in milliseconds (default: 2000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_store_path() -> String {
    "infobot.redb".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}
