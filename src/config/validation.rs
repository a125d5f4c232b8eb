//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, StoreBackend};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("channel must start with '#' or '&', got '{0}'")]
    InvalidChannel(String),
    #[error("irc.host is required")]
    MissingHost,
    #[error("irc.port must not be 0")]
    InvalidPort,
    #[error("irc.nick is required")]
    MissingNick,
    #[error("irc.nick contains characters IRC does not allow: '{0}'")]
    InvalidNick(String),
    #[error("store.timeout_ms must be greater than 0")]
    ZeroStoreTimeout,
    #[error("store.path is required for the redb backend")]
    MissingStorePath,
    #[error("store.path parent directory does not exist: {0}")]
    StorePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let channel = &config.channel;
    if !(channel.starts_with('#') || channel.starts_with('&'))
        || channel.len() < 2
        || channel.contains([' ', ',', '\x07'])
    {
        errors.push(ValidationError::InvalidChannel(channel.clone()));
    }

    if config.irc.host.trim().is_empty() {
        errors.push(ValidationError::MissingHost);
    }
    if config.irc.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    let nick = &config.irc.nick;
    if nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    } else if !is_valid_nick(nick) {
        errors.push(ValidationError::InvalidNick(nick.clone()));
    }

    if config.store.timeout_ms == 0 {
        errors.push(ValidationError::ZeroStoreTimeout);
    }

    if config.store.backend == StoreBackend::Redb {
        let path = Path::new(&config.store.path);
        if config.store.path.is_empty() {
            errors.push(ValidationError::MissingStorePath);
        } else if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::StorePathInvalid(config.store.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 2812 nickname: a letter or special first, then letters, digits,
/// specials or '-'.
fn is_valid_nick(nick: &str) -> bool {
    let is_special = |c: char| "[]\\`_^{|}".contains(c);
    let mut chars = nick.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || is_special(first) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-')
}
