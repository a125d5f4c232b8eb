//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config, IRC connection and logging settings
//! - [`store`]: Storage backend configuration (StoreConfig, StoreBackend)
//! - [`validation`]: Startup checks that report every problem at once

mod store;
mod types;
pub mod validation;

pub use store::{StoreBackend, StoreConfig};
pub use types::{Config, ConfigError, IrcConfig, LogConfig, LogFormat};
