//! Persistent reactive slots.
//!
//! A [`Slot`] binds one key of a namespaced [`Store`](crate::Store) to an
//! in-memory [`State`]. It is the native counterpart of a
//! `useLocalStorage`/`useSessionStorage` hook:
//!
//! 1. **Bind**: read the key once; a missing entry, unparseable text, an
//!    absent store or a store error all fall back to the initial value.
//! 2. **Write-through**: every write updates memory first, then serializes the
//!    new value to JSON and stores it. Persistence failures are logged and
//!    dropped, never rolled back into memory.
//! 3. **Notify**: subscribers see each new value after it is committed.
//!
//! Two slots bound to the same key are independent mirrors of the same stored
//! text. Neither sees the other's writes until it is bound again; live
//! synchronization between observers is not provided.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::observe::{lock, State, Subscription};
use crate::store::{Namespace, Storage, Store};

/// Values a slot can hold: anything that round-trips through JSON.
pub trait SlotValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> SlotValue for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// A write to a slot: either a literal value or a function of the previous one.
pub enum Update<T> {
    Value(T),
    With(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Update<T> {
    /// Wraps a functional update.
    pub fn with(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Update::With(Box::new(f))
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Update::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Update::With(_) => f.write_str("With(..)"),
        }
    }
}

/// A typed, persisted value with a reactive in-memory mirror.
///
/// Clones share the same mirror; a fresh [`Slot::bind`] on the same key
/// creates a new one, rebuilt from the store. Writes through any clone are
/// serialized: a functional update always sees the previous write, and the
/// stored text always matches the value in memory.
///
/// # Example
///
/// ```rust
/// use keepsake::{Namespace, Slot, Storage};
///
/// let storage = Storage::in_memory();
///
/// let volume = Slot::bind(&storage, Namespace::Local, "volume", 5u8);
/// assert_eq!(volume.get(), 5);
///
/// volume.update(|v| v + 1);
///
/// let again = Slot::bind(&storage, Namespace::Local, "volume", 0u8);
/// assert_eq!(again.get(), 6);
/// ```
pub struct Slot<T> {
    key: Arc<str>,
    namespace: Namespace,
    store: Option<Arc<dyn Store>>,
    state: State<T>,
    writes: Arc<Mutex<()>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            namespace: self.namespace,
            store: self.store.clone(),
            state: self.state.clone(),
            writes: Arc::clone(&self.writes),
        }
    }
}

impl<T: SlotValue> Slot<T> {
    /// Binds `key` in `namespace`, falling back to `initial`.
    ///
    /// The resolved value is written back once, so a defaulted key becomes
    /// persisted.
    pub fn bind(
        storage: &Storage,
        namespace: Namespace,
        key: impl Into<String>,
        initial: T,
    ) -> Self {
        let key: Arc<str> = Arc::from(key.into());
        let store = storage.store(namespace).cloned();
        let value = match &store {
            Some(store) => read(&**store, namespace, &key).unwrap_or(initial),
            None => {
                tracing::debug!(
                    %namespace,
                    key = %key,
                    "no store available, using initial value"
                );
                initial
            }
        };

        let slot = Self {
            key,
            namespace,
            store,
            state: State::new(value),
            writes: Arc::new(Mutex::new(())),
        };
        slot.state.with(|value| slot.persist(value));
        slot
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.state.get()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.state.with(f)
    }

    /// Replaces the value.
    pub fn set(&self, value: T) {
        self.commit(move |_| value);
    }

    /// Computes the next value from the previous one.
    ///
    /// `f` runs while the slot is locked for writing and must not touch the
    /// slot itself.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.commit(f);
    }

    /// Applies a literal or functional update.
    pub fn apply(&self, update: Update<T>) {
        match update {
            Update::Value(value) => self.commit(move |_| value),
            Update::With(f) => self.commit(f),
        }
    }

    /// Subscribes to committed values.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    /// The key this slot is bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The namespace this slot is bound in.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Number of live subscriptions on this slot's mirror.
    pub fn listener_count(&self) -> usize {
        self.state.listener_count()
    }

    /// Commits to memory, then writes through, then notifies. The write lock
    /// spans the first two steps so concurrent writers cannot interleave.
    fn commit(&self, f: impl FnOnce(&T) -> T) {
        let next = {
            let _writing = lock(&self.writes);
            let next = self.state.replace_with(f);
            self.persist(&next);
            next
        };
        self.state.notify(&next);
    }

    fn persist(&self, value: &T) {
        let Some(store) = &self.store else {
            return;
        };
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(
                    namespace = %self.namespace,
                    key = %self.key,
                    error = %err,
                    "value not serializable, skipping write"
                );
                return;
            }
        };
        if let Err(err) = store.set(&self.key, &text) {
            tracing::debug!(
                namespace = %self.namespace,
                key = %self.key,
                error = %err,
                "store write failed, keeping value in memory only"
            );
        }
    }
}

fn read<T: SlotValue>(store: &dyn Store, namespace: Namespace, key: &str) -> Option<T> {
    let text = match store.get(key) {
        Ok(Some(text)) if !text.is_empty() => text,
        Ok(_) => return None,
        Err(err) => {
            tracing::debug!(
                %namespace,
                key,
                error = %err,
                "store read failed, using initial value"
            );
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(
                %namespace,
                key,
                error = %err,
                "stored text is not a valid value, using initial value"
            );
            None
        }
    }
}

impl<T: fmt::Debug + SlotValue> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("namespace", &self.namespace)
            .field("key", &self.key)
            .field("value", &self.get())
            .finish()
    }
}
