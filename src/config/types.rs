//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::store::StoreConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Channel whose community this directory serves (e.g. "#rust").
    pub channel: String,
    /// Rejoin and announce after being kicked from the channel.
    #[serde(default)]
    pub autorejoin: bool,
    /// Prometheus metrics HTTP port. 0 (the default) disables the endpoint.
    #[serde(default)]
    pub metrics_port: u16,
    /// IRC server connection.
    pub irc: IrcConfig,
    /// Storage backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// IRC server connection and bot identity.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    /// Server hostname (e.g. "irc.libera.chat").
    pub host: String,
    /// Server port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect over TLS.
    #[serde(default)]
    pub tls: bool,
    /// Verify the server certificate against the system roots (default: true).
    /// Only disable for self-signed test networks.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
    /// Nickname the bot registers with.
    pub nick: String,
    /// Username for USER. Defaults to the nickname.
    pub user: Option<String>,
    /// Realname for USER.
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Server password sent with PASS (optional).
    pub password: Option<String>,
}

impl IrcConfig {
    /// Username sent in USER, falling back to the nickname.
    pub fn username(&self) -> &str {
        self.user.as_deref().unwrap_or(&self.nick)
    }

    /// `host:port` for connecting.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration. Filtering is controlled by `RUST_LOG`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_port() -> u16 {
    6667
}

fn default_realname() -> String {
    "infobot".to_string()
}

fn default_true() -> bool {
    true
}
