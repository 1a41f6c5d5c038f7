//! In-process key-value store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Store, StoreError};
use crate::observe::lock;

/// Key/text entries with browser-style quota accounting.
///
/// Usage is the sum of key and value lengths in bytes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Entries {
    map: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl Entries {
    pub(crate) fn new(quota: Option<usize>) -> Self {
        Self {
            map: BTreeMap::new(),
            quota,
        }
    }

    pub(crate) fn from_map(map: BTreeMap<String, String>, quota: Option<usize>) -> Self {
        Self { map, quota }
    }

    pub(crate) fn map(&self) -> &BTreeMap<String, String> {
        &self.map
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub(crate) fn usage(&self) -> usize {
        self.map.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Checks the quota for a pending write without applying it.
    pub(crate) fn check(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let Some(quota) = self.quota else {
            return Ok(());
        };
        let current = self.map.get(key).map_or(0, |old| key.len() + old.len());
        let needed = self.usage() - current + key.len() + value.len();
        if needed > quota {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota,
            });
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check(key, value)?;
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }
}

/// A store that lives as long as the process.
///
/// Serves as the session namespace of a native application, and as a test
/// double for durable stores. An optional quota makes writes fail the way a
/// full browser store does.
///
/// # Example
///
/// ```rust
/// use keepsake::{MemoryStore, Store};
///
/// let store = MemoryStore::with_quota(8);
/// assert!(store.set("k", "short").is_ok());
/// assert!(store.set("k", "far too long").is_err());
/// assert_eq!(store.get("k").unwrap().as_deref(), Some("short"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes past `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::new(Some(quota))),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn usage(&self) -> usize {
        lock(&self.entries).usage()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        lock(&self.entries).clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(lock(&self.entries).map().keys().cloned().collect())
    }
}
