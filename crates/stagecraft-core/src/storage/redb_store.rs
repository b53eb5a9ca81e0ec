//! # redb-backed Backup Store
//!
//! A disk-backed slot store using the redb embedded database, providing:
//! - ACID transactions (a crash mid-write leaves the previous backup intact)
//! - Crash safety (copy-on-write B-trees)
//! - Zero configuration
//!
//! One table, `backups`, maps slot keys to envelope JSON text.

use super::KeyValueStore;
use crate::SessionError;
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::Path;

/// Table for backups: slot key -> envelope JSON text
const BACKUPS: TableDefinition<&str, &str> = TableDefinition::new("backups");

fn storage_error(e: impl std::fmt::Display) -> SessionError {
    SessionError::StorageError(e.to_string())
}

/// A disk-backed backup store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a backup database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let db = Database::create(path.as_ref()).map_err(storage_error)?;

        // Initialize the table so first reads see an empty store, not an error
        {
            let write_txn = db.begin_write().map_err(storage_error)?;
            let _ = write_txn.open_table(BACKUPS).map_err(storage_error)?;
            write_txn.commit().map_err(storage_error)?;
        }

        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        let read_txn = self.db.begin_read().map_err(storage_error)?;
        let table = read_txn.open_table(BACKUPS).map_err(storage_error)?;
        let value = table
            .get(key)
            .map_err(storage_error)?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        {
            let mut table = write_txn.open_table(BACKUPS).map_err(storage_error)?;
            table.insert(key, value).map_err(storage_error)?;
        }
        write_txn.commit().map_err(storage_error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, SessionError> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        let removed = {
            let mut table = write_txn.open_table(BACKUPS).map_err(storage_error)?;
            table.remove(key).map_err(storage_error)?.is_some()
        };
        write_txn.commit().map_err(storage_error)?;
        Ok(removed)
    }
}
