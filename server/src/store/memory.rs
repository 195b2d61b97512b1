//! In-memory config store.
//!
//! Backs tests and ephemeral deployments. Reads share a read lock; writes take
//! the write lock, which serializes writers per store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{ConfigEntry, ConfigStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `entries`.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(name).cloned())
    }

    fn upsert(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn insert_if_absent(&self, name: &str, value: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        if entries.contains_key(name) {
            return Ok(false);
        }
        entries.insert(name.to_string(), value.to_string());
        Ok(true)
    }

    fn entries(&self) -> Result<Vec<ConfigEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries
            .iter()
            .map(|(name, value)| ConfigEntry {
                name: name.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.clear();
        Ok(())
    }
}
