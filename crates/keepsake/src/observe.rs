//! Change notification primitives.
//!
//! This module provides the observer layer every hook in the crate is built on:
//!
//! - [`Listeners`]: a registry of change callbacks
//! - [`Subscription`]: a guard that removes its callback when dropped
//! - [`State`]: a shared value cell that notifies listeners on every write
//!
//! Callbacks always run after internal locks are released, so a listener may
//! read the value it was notified about, write back, or drop its own
//! subscription without deadlocking.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A change callback.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// An ordered set of change callbacks.
///
/// Listeners are called in subscription order. The registry hands out
/// [`Subscription`] guards; a callback stays registered exactly as long as its
/// guard is alive.
pub struct Listeners<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Listeners<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Registers a callback, returning the guard that keeps it registered.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(listener)));
            id
        };
        tracing::trace!(id, "listener subscribed");

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).entries.retain(|(entry, _)| *entry != id);
                tracing::trace!(id, "listener unsubscribed");
            }
        })
    }

    /// Calls every registered callback with `value`.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = lock(&self.registry)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    /// Returns `true` when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &lock(&self.registry).entries.len())
            .finish()
    }
}

/// Keeps a callback registered until dropped.
///
/// Dropping the guard releases the registration on every exit path, which is
/// how observers guarantee that nothing they registered fires after they are
/// gone.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription to a source that will never fire.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Releases the registration now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

struct Cell<T> {
    value: Mutex<T>,
    listeners: Listeners<T>,
}

/// A shared reactive value.
///
/// Clones share the same cell. Every write replaces the value and then
/// notifies subscribers with the new value.
///
/// # Example
///
/// ```rust
/// use keepsake::State;
/// use std::sync::{Arc, Mutex};
///
/// let count = State::new(0);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// let _guard = count.subscribe(move |n| sink.lock().unwrap().push(*n));
///
/// count.set(1);
/// count.update(|n| n + 1);
///
/// assert_eq!(count.get(), 2);
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
pub struct State<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Clone + Send + 'static> State<T> {
    /// Creates a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(Cell {
                value: Mutex::new(value),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        lock(&self.cell.value).clone()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&lock(&self.cell.value))
    }

    /// Replaces the value and notifies subscribers.
    pub fn set(&self, value: T) {
        {
            *lock(&self.cell.value) = value.clone();
        }
        self.cell.listeners.notify(&value);
    }

    /// Computes the next value from the previous one.
    ///
    /// Returns the value that was stored.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> T {
        let next = self.replace_with(f);
        self.notify(&next);
        next
    }

    /// Computes and stores the next value under the value lock, without
    /// notifying. Pair with [`State::notify`] once the lock-free part is done.
    pub(crate) fn replace_with(&self, f: impl FnOnce(&T) -> T) -> T {
        let mut guard = lock(&self.cell.value);
        let next = f(&guard);
        *guard = next.clone();
        next
    }

    pub(crate) fn notify(&self, value: &T) {
        self.cell.listeners.notify(value);
    }

    /// Mutates the value in place and notifies subscribers.
    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        let next = {
            let mut guard = lock(&self.cell.value);
            f(&mut guard);
            guard.clone()
        };
        self.cell.listeners.notify(&next);
    }

    /// Subscribes to writes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.cell.listeners.subscribe(listener)
    }

    /// Number of live subscriptions on this cell.
    pub fn listener_count(&self) -> usize {
        self.cell.listeners.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &*lock(&self.cell.value))
            .field("listeners", &self.cell.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync)
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value: &T| sink.lock().unwrap().push(value.clone()))
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    #[test]
    fn test_listeners_notify_in_order() {
        let listeners = Listeners::<u8>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = listeners.subscribe(move |_| first.lock().unwrap().push("a"));
        let second = Arc::clone(&order);
        let _b = listeners.subscribe(move |_| second.lock().unwrap().push("b"));

        listeners.notify(&1);
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_dropped_subscription_stops_notifications() {
        let listeners = Listeners::<u8>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let guard = listeners.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        listeners.notify(&1);
        drop(guard);
        listeners.notify(&2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let listeners = Listeners::<u8>::new();
        let guard = listeners.subscribe(|_| {});
        assert_eq!(listeners.len(), 1);
        guard.unsubscribe();
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_subscription_outliving_source_is_harmless() {
        let listeners = Listeners::<u8>::new();
        let guard = listeners.subscribe(|_| {});
        drop(listeners);
        drop(guard);
    }

    #[test]
    fn test_noop_subscription() {
        let guard = Subscription::noop();
        assert!(format!("{:?}", guard).contains("false"));
    }

    // =========================================================================
    // State
    // =========================================================================

    #[test]
    fn test_state_set_notifies_new_value() {
        let state = State::new("a".to_string());
        let (seen, listener) = recorder();
        let _guard = state.subscribe(listener);

        state.set("b".to_string());

        assert_eq!(state.get(), "b");
        assert_eq!(*seen.lock().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_state_update_uses_previous_value() {
        let state = State::new(10);
        let stored = state.update(|n| n * 2);
        assert_eq!(stored, 20);
        assert_eq!(state.get(), 20);
    }

    #[test]
    fn test_state_modify_in_place() {
        let state = State::new(vec![1]);
        state.modify(|v| v.push(2));
        assert_eq!(state.with(|v| v.len()), 2);
    }

    #[test]
    fn test_state_clones_share_value() {
        let state = State::new(1);
        let other = state.clone();
        other.set(5);
        assert_eq!(state.get(), 5);
    }

    #[test]
    fn test_listener_may_write_back_without_deadlock() {
        let state = State::new(0);
        let inner = state.clone();
        let _guard = state.subscribe(move |n| {
            if *n == 1 {
                inner.set(2);
            }
        });

        state.set(1);
        assert_eq!(state.get(), 2);
    }

    #[test]
    fn test_listener_count_tracks_guards() {
        let state = State::new(());
        let a = state.subscribe(|_| {});
        let b = state.subscribe(|_| {});
        assert_eq!(state.listener_count(), 2);
        drop(a);
        assert_eq!(state.listener_count(), 1);
        drop(b);
        assert_eq!(state.listener_count(), 0);
    }
}
