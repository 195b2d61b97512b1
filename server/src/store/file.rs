//! JSON-file config store.
//!
//! The whole store is one JSON object of string values. Every mutation
//! rewrites the file through a temporary file in the same directory that is
//! then atomically renamed over the original, so readers never observe a
//! half-written file.
//!
//! # Invariants
//! - The in-memory map always mirrors the last successfully persisted file.
//! - Writers are serialized by a single mutex.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use super::{ConfigEntry, ConfigStore, StoreError};

#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileConfigStore {
    /// Open the store at `path`, creating an empty one if the file is missing.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the file cannot be read or the parent
    /// directory cannot be created, and `StoreError::Corrupt` if the contents
    /// are not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Opened config store at {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the entries, persist it, then publish it.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> Result<T, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut updated = entries.clone();
        let result = change(&mut updated);
        self.persist(&updated)?;
        *entries = updated;
        drop(entries);
        Ok(result)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let directory = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let bytes =
            serde_json::to_vec_pretty(entries).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut file = NamedTempFile::new_in(directory)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(name).cloned())
    }

    fn upsert(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.mutate(|entries| {
            entries.insert(name.to_string(), value.to_string());
        })
    }

    fn insert_if_absent(&self, name: &str, value: &str) -> Result<bool, StoreError> {
        {
            let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
            if entries.contains_key(name) {
                return Ok(false);
            }
        }
        self.mutate(|entries| {
            if entries.contains_key(name) {
                return false;
            }
            entries.insert(name.to_string(), value.to_string());
            true
        })
    }

    fn entries(&self) -> Result<Vec<ConfigEntry>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries
            .iter()
            .map(|(name, value)| ConfigEntry {
                name: name.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.mutate(BTreeMap::clear)?;
        tracing::info!("Cleared config store at {}", self.path.display());
        Ok(())
    }
}
