//! Store backends for integration tests.

use async_trait::async_trait;
use infobot::store::memory::MemoryBackend;
use infobot::store::{KvBackend, Namespace, StoreError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory backend that counts writes and can stall or fail on demand.
#[derive(Default)]
pub struct ScriptedBackend {
    inner: MemoryBackend,
    writes: AtomicUsize,
    stall_calls: AtomicUsize,
    fail_flag_deletes: AtomicBool,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` and `delete` calls that reached the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Never answer the next `n` calls.
    pub fn stall_next(&self, n: usize) {
        self.stall_calls.store(n, Ordering::SeqCst);
    }

    /// Make deletes in the flag namespace fail.
    pub fn fail_flag_deletes(&self, fail: bool) {
        self.fail_flag_deletes.store(fail, Ordering::SeqCst);
    }

    /// Write straight to the store, bypassing the directory.
    pub async fn seed(&self, ns: Namespace, key: &str, value: &str) {
        self.inner.set(ns, key, value).await.unwrap();
    }

    pub async fn raw(&self, ns: Namespace, key: &str) -> Option<String> {
        self.inner.get(ns, key).await.unwrap()
    }

    async fn maybe_stall(&self) {
        let stalled = self
            .stall_calls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stalled {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl KvBackend for ScriptedBackend {
    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        self.maybe_stall().await;
        self.inner.get(ns, key).await
    }

    async fn set(&self, ns: Namespace, key: &str, value: &str) -> Result<(), StoreError> {
        self.maybe_stall().await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(ns, key, value).await
    }

    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        self.maybe_stall().await;
        self.writes.fetch_add(1, Ordering::SeqCst);
        if ns == Namespace::Flag && self.fail_flag_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("flag table unavailable".into()));
        }
        self.inner.delete(ns, key).await
    }
}
