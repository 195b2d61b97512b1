//! Config store.
//!
//! Named string settings (algorithm choice, encrypted key material, feature
//! flags) behind the [`ConfigStore`] trait.
//!
//! # Invariants
//! - Names are unique; a write to an existing name replaces its value.
//! - `save` skips empty values, so partial updates only write what is present.
//! - Entries are never deleted individually; `clear` is the whole-store teardown.

pub mod file;
pub mod memory;

pub use file::FileConfigStore;
pub use memory::MemoryConfigStore;

use std::collections::BTreeMap;

use crate::auth::SigningAlgorithm;

/// Well-known config names.
pub mod keys {
    pub const ALGORITHM: &str = "algorithm";
    pub const SECRET_KEY: &str = "secret_key";
    pub const PRIVATE_KEY: &str = "private_key";
    pub const PUBLIC_KEY: &str = "public_key";
    pub const ENABLE_AUTH: &str = "enable_auth";
    pub const ENABLE_CORS: &str = "enable_cors";
    pub const DISABLE_XMLRPC: &str = "disable_xmlrpc";
    pub const SUPPORTED_ALGO: &str = "supported_algo";
}

/// A single named setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    pub value: String,
}

/// Error returned when the backing storage fails.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io(std::io::Error),
    /// The backing file is not a JSON object of strings.
    Corrupt(String),
    /// A lock guarding the store was poisoned.
    LockPoisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config store I/O error: {e}"),
            Self::Corrupt(reason) => write!(f, "config store is corrupt: {reason}"),
            Self::LockPoisoned => write!(f, "config store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Corrupt(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Persistence of named string settings.
///
/// Implementations serialize their own writers; concurrent writes to the same
/// name are last-write-wins.
pub trait ConfigStore: Send + Sync {
    /// Look up a single value by name.
    fn get(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Update the value of `name`, inserting it if it does not exist.
    fn upsert(&self, name: &str, value: &str) -> Result<(), StoreError>;

    /// Insert `name` only if it does not exist yet.
    ///
    /// Returns whether the entry was inserted.
    fn insert_if_absent(&self, name: &str, value: &str) -> Result<bool, StoreError>;

    /// All entries ordered by name.
    fn entries(&self) -> Result<Vec<ConfigEntry>, StoreError>;

    /// Remove every entry.
    fn clear(&self) -> Result<(), StoreError>;

    /// Upsert every non-empty entry of `configs`.
    ///
    /// Empty values are skipped entirely rather than written as empty strings.
    /// The first failing write aborts the call; earlier writes of the same
    /// call are kept (there is no atomicity across names).
    fn save(&self, configs: &BTreeMap<String, String>) -> Result<(), StoreError> {
        for (name, value) in configs {
            if value.is_empty() {
                continue;
            }
            self.upsert(name, value)?;
        }
        Ok(())
    }
}

/// Values written by [`provision_defaults`].
#[must_use]
pub fn default_entries() -> Vec<ConfigEntry> {
    let supported = SigningAlgorithm::ALL
        .iter()
        .map(|algorithm| algorithm.as_str())
        .collect::<Vec<_>>();
    // A list of plain strings always serializes.
    let supported = serde_json::to_string(&supported).unwrap_or_default();

    [
        (keys::ENABLE_AUTH, "0"),
        (keys::ALGORITHM, SigningAlgorithm::HS256.as_str()),
        (keys::SECRET_KEY, ""),
        (keys::PUBLIC_KEY, ""),
        (keys::PRIVATE_KEY, ""),
        (keys::ENABLE_CORS, "0"),
        (keys::DISABLE_XMLRPC, "0"),
        (keys::SUPPORTED_ALGO, supported.as_str()),
    ]
    .into_iter()
    .map(|(name, value)| ConfigEntry {
        name: name.to_string(),
        value: value.to_string(),
    })
    .collect()
}

/// Insert the first-run defaults, leaving existing entries untouched.
///
/// Returns the number of entries inserted.
pub fn provision_defaults(store: &dyn ConfigStore) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for entry in default_entries() {
        if store.insert_if_absent(&entry.name, &entry.value)? {
            inserted += 1;
        }
    }
    if inserted > 0 {
        tracing::info!("Provisioned {inserted} default config entries");
    }
    Ok(inserted)
}

/// Remove every config entry, as done when the service is uninstalled.
///
/// Returns the number of entries removed.
///
/// # Errors
///
/// Returns the store error if the entries cannot be listed or removed.
pub fn drop_configs(store: &dyn ConfigStore) -> Result<usize, StoreError> {
    let removed = store.entries()?.len();
    store.clear()?;
    tracing::info!("Dropped {removed} config entries");
    Ok(removed)
}

/// Interpret a stored flag the way settings are written (`"1"`/`"0"`).
#[must_use]
pub fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "on" | "yes")
    )
}
