//! In-memory backend.
//!
//! Used for tests and dry runs. All data is lost when the process exits.

use super::{KvBackend, Namespace, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, String>,
    flags: DashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, ns: Namespace) -> &DashMap<String, String> {
        match ns {
            Namespace::Entry => &self.entries,
            Namespace::Flag => &self.flags,
        }
    }

    /// Number of keys held in a namespace.
    pub fn len(&self, ns: Namespace) -> usize {
        self.table(ns).len()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.table(ns).get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, ns: Namespace, key: &str, value: &str) -> Result<(), StoreError> {
        self.table(ns).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        self.table(ns).remove(key);
        Ok(())
    }
}
