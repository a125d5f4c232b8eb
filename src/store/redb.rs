//! Redb-backed persistent storage.
//!
//! Implements [`KvBackend`] on the redb embedded database. Entries and
//! freeze flags live in separate tables. redb is synchronous, so every
//! operation runs on the blocking thread pool and commits its own write
//! transaction.
//!
//! A blocking task cannot be cancelled. When the directory's timeout fires
//! the transaction keeps running, so a write reported as failed may still
//! commit. Writes are last-write-wins either way.

use super::{KvBackend, Namespace, StoreError};
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

const ENTRY_TABLE: TableDefinition<&str, &str> = TableDefinition::new("entries");
const FLAG_TABLE: TableDefinition<&str, &str> = TableDefinition::new("flags");

fn table_for(ns: Namespace) -> TableDefinition<'static, &'static str, &'static str> {
    match ns {
        Namespace::Entry => ENTRY_TABLE,
        Namespace::Flag => FLAG_TABLE,
    }
}

fn db_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(e.to_string())
}

pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open (or create) the database file and make sure both tables exist,
    /// so reads never hit a missing table.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(db_err)?;

        let write_txn = db.begin_write().map_err(db_err)?;
        {
            write_txn.open_table(ENTRY_TABLE).map_err(db_err)?;
            write_txn.open_table(FLAG_TABLE).map_err(db_err)?;
        }
        write_txn.commit().map_err(db_err)?;

        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl KvBackend for RedbBackend {
    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.blocking(move |db| {
            let read_txn = db.begin_read().map_err(db_err)?;
            let table = read_txn.open_table(table_for(ns)).map_err(db_err)?;
            let value = table.get(key.as_str()).map_err(db_err)?;
            Ok(value.map(|v| v.value().to_string()))
        })
        .await
    }

    async fn set(&self, ns: Namespace, key: &str, value: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.to_string();
        self.blocking(move |db| {
            let write_txn = db.begin_write().map_err(db_err)?;
            {
                let mut table = write_txn.open_table(table_for(ns)).map_err(db_err)?;
                table.insert(key.as_str(), value.as_str()).map_err(db_err)?;
            }
            write_txn.commit().map_err(db_err)
        })
        .await
    }

    async fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.blocking(move |db| {
            let write_txn = db.begin_write().map_err(db_err)?;
            {
                let mut table = write_txn.open_table(table_for(ns)).map_err(db_err)?;
                table.remove(key.as_str()).map_err(db_err)?;
            }
            write_txn.commit().map_err(db_err)
        })
        .await
    }
}
