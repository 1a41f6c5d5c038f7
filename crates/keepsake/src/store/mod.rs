//! Key-value persistence stores.
//!
//! This module provides:
//!
//! - [`Store`]: the capability a slot persists through (`get`/`set` on text)
//! - [`MemoryStore`]: process-lifetime store, optionally quota-limited
//! - [`FileStore`]: durable store kept in a JSON file
//! - [`Namespace`]: the `local` and `session` key spaces
//! - [`Storage`]: the environment handle mapping each namespace to a store
//!
//! Stores are passed in rather than reached through a global, so tests can
//! swap in fakes and the two namespaces share one code path.

mod error;
mod file;
mod memory;
mod namespace;

use std::fmt;
use std::sync::Arc;

pub use error::StoreError;
pub use file::{FileStore, DEFAULT_FILE_NAME};
pub use memory::MemoryStore;
pub use namespace::{Namespace, ParseNamespaceError};

/// A text key-value store with `getItem`/`setItem` semantics.
///
/// Implementations must be safe to share between threads; every method takes
/// `&self`.
pub trait Store: Send + Sync {
    /// Returns the text stored at `key`, or `None` when there is no entry.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` at `key`, replacing any previous entry.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes the entry at `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Deletes every entry.
    fn clear(&self) -> Result<(), StoreError>;

    /// Lists stored keys.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }
}

/// The persistence environment hooks run in.
///
/// Holds at most one store per [`Namespace`]. A namespace without a store
/// behaves like server-side rendering: reads fall back to defaults and writes
/// are skipped. Clones share the same stores.
///
/// # Example
///
/// ```rust
/// use keepsake::{Namespace, Storage};
///
/// let storage = Storage::in_memory();
/// assert!(storage.is_available(Namespace::Local));
///
/// let headless = Storage::unavailable();
/// assert!(!headless.is_available(Namespace::Session));
/// ```
#[derive(Clone, Default)]
pub struct Storage {
    local: Option<Arc<dyn Store>>,
    session: Option<Arc<dyn Store>>,
}

impl Storage {
    /// Creates an environment from explicit stores.
    pub fn new(local: Option<Arc<dyn Store>>, session: Option<Arc<dyn Store>>) -> Self {
        Self { local, session }
    }

    /// Two independent unbounded [`MemoryStore`]s.
    pub fn in_memory() -> Self {
        Self::new(
            Some(Arc::new(MemoryStore::new())),
            Some(Arc::new(MemoryStore::new())),
        )
    }

    /// No stores at all.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Replaces the store behind `namespace`.
    pub fn with_store(mut self, namespace: Namespace, store: Arc<dyn Store>) -> Self {
        match namespace {
            Namespace::Local => self.local = Some(store),
            Namespace::Session => self.session = Some(store),
        }
        self
    }

    /// The store behind `namespace`, if any.
    pub fn store(&self, namespace: Namespace) -> Option<&Arc<dyn Store>> {
        match namespace {
            Namespace::Local => self.local.as_ref(),
            Namespace::Session => self.session.as_ref(),
        }
    }

    /// Capability check performed before any store access.
    pub fn is_available(&self, namespace: Namespace) -> bool {
        self.store(namespace).is_some()
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("local", &self.local.is_some())
            .field("session", &self.session.is_some())
            .finish()
    }
}
