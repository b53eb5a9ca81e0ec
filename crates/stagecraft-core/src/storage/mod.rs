//! # Backup Stores
//!
//! The engine writes backups through the [`KeyValueStore`] trait so the host
//! chooses where they live:
//! - `MemoryStore`: volatile map, used by tests and ephemeral hosts
//! - `RedbStore`: disk-backed redb database, used by the CLI
//!
//! Values are the JSON text of an envelope. Writers to the same key follow
//! last-writer-wins; there is no cross-process coordination.

mod redb_store;

pub use redb_store::RedbStore;

use crate::SessionError;
use std::collections::BTreeMap;

/// A string-keyed slot store holding serialized envelopes.
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` means the slot is empty.
    fn read(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Overwrite a slot.
    fn write(&mut self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Empty a slot. Returns whether anything was removed.
    fn remove(&mut self, key: &str) -> Result<bool, SessionError>;
}

/// In-memory store. Contents are lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, SessionError> {
        Ok(self.slots.remove(key).is_some())
    }
}
