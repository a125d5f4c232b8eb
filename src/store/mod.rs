//! Key-value storage backends for the directory.
//!
//! Backends know nothing about entries or freeze flags beyond the
//! [`Namespace`] a key lives in; the semantics sit in
//! [`Directory`](crate::directory::Directory).

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};

pub mod memory;
pub mod redb;

/// Logical key space. Each namespace is stored separately by every backend,
/// so a key in one can never be read back through the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Info text, keyed by normalized identity.
    Entry,
    /// Freeze flags, keyed by normalized identity.
    Flag,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("store task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "store_database",
            Self::Timeout(_) => "store_timeout",
            Self::Task(_) => "store_task",
        }
    }
}

/// Minimal key-value contract the directory needs.
///
/// Each call must be atomic for its single key. Nothing is promised across
/// keys or namespaces.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read a value.
    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, ns: Namespace, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError>;
}

/// Open the backend selected by configuration.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn KvBackend>, StoreError> {
    match config.backend {
        StoreBackend::Redb => {
            info!(path = %config.path, "Opening redb store");
            Ok(Arc::new(redb::RedbBackend::open(&config.path)?))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; entries will not survive a restart");
            Ok(Arc::new(memory::MemoryBackend::new()))
        }
    }
}
