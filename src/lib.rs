//! infobot - an IRC channel directory bot.
//!
//! Channel members store a line of info about themselves with `.add`,
//! anyone can look it up with `.info`, and channel operators can delete,
//! freeze, unfreeze, or overwrite entries.

pub mod bot;
pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod membership;
pub mod metrics;
pub mod router;
pub mod store;
pub mod telemetry;
