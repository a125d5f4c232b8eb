//! Directory store: member info entries and their freeze flags.
//!
//! A thin semantic layer over a [`KvBackend`]. Entries and freeze flags are
//! kept in separate namespaces, so no info text can ever be mistaken for a
//! flag. Every backend call runs under a request-scoped timeout so a stalled
//! store fails one command instead of wedging the bot. The timeout abandons
//! the wait only; a backend may still finish the write afterwards.

use infobot_proto::irc_to_lower;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::store::{KvBackend, Namespace, StoreError};

/// Names starting with this character are reserved and never name an entry.
pub const RESERVED_PREFIX: char = '*';

/// Value written to the flag namespace for a frozen identity.
const FROZEN_MARKER: &str = "frozen";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("empty name")]
    Empty,
    #[error("reserved name: {0}")]
    Reserved(String),
}

/// A member name as typed, plus its case-folded storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    display: String,
    key: String,
}

impl Identity {
    /// Trim and validate a member name.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let display = raw.trim();
        if display.is_empty() {
            return Err(IdentityError::Empty);
        }
        if display.starts_with(RESERVED_PREFIX) {
            return Err(IdentityError::Reserved(display.to_string()));
        }
        Ok(Self {
            display: display.to_string(),
            key: irc_to_lower(&display.to_lowercase()),
        })
    }

    /// The name as the caller wrote it.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Normalized storage key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Entry and freeze-flag operations for one channel's directory.
#[derive(Clone)]
pub struct Directory {
    backend: Arc<dyn KvBackend>,
    timeout: Duration,
}

impl Directory {
    pub fn new(backend: Arc<dyn KvBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }

    pub async fn get_entry(&self, id: &Identity) -> Result<Option<String>, StoreError> {
        self.bounded(self.backend.get(Namespace::Entry, id.key()))
            .await
    }

    /// Unconditional overwrite.
    pub async fn set_entry(&self, id: &Identity, info: &str) -> Result<(), StoreError> {
        debug!(name = %id.key(), "Writing entry");
        self.bounded(self.backend.set(Namespace::Entry, id.key(), info))
            .await
    }

    /// Remove an entry. Succeeds when there was nothing to remove.
    pub async fn delete_entry(&self, id: &Identity) -> Result<(), StoreError> {
        debug!(name = %id.key(), "Deleting entry");
        self.bounded(self.backend.delete(Namespace::Entry, id.key()))
            .await
    }

    pub async fn is_frozen(&self, id: &Identity) -> Result<bool, StoreError> {
        let flag = self
            .bounded(self.backend.get(Namespace::Flag, id.key()))
            .await?;
        Ok(flag.is_some())
    }

    /// Write or clear the freeze flag.
    pub async fn set_frozen(&self, id: &Identity, frozen: bool) -> Result<(), StoreError> {
        debug!(name = %id.key(), frozen, "Updating freeze flag");
        if frozen {
            self.bounded(self.backend.set(Namespace::Flag, id.key(), FROZEN_MARKER))
                .await
        } else {
            self.bounded(self.backend.delete(Namespace::Flag, id.key()))
                .await
        }
    }

    /// Clear the freeze flag as part of deleting an entry.
    pub async fn delete_freeze_flag(&self, id: &Identity) -> Result<(), StoreError> {
        debug!(name = %id.key(), "Clearing freeze flag of deleted entry");
        self.bounded(self.backend.delete(Namespace::Flag, id.key()))
            .await
    }
}
