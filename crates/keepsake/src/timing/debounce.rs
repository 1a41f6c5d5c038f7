//! Debounced values.

use std::time::Duration;

use super::Deferred;
use crate::observe::{State, Subscription};

/// Delay used by [`Debounced::with_default_delay`].
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// A value that only takes on a pushed update once `delay` passes without a
/// newer one.
///
/// Outside a tokio runtime pushes apply immediately.
#[derive(Debug)]
pub struct Debounced<T> {
    delay: Duration,
    state: State<T>,
    timer: Deferred,
}

impl<T: Clone + Send + Sync + 'static> Debounced<T> {
    /// Creates a debounced value settling after `delay`.
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            state: State::new(initial),
            timer: Deferred::new(),
        }
    }

    /// Creates a debounced value with the default delay.
    pub fn with_default_delay(initial: T) -> Self {
        Self::new(initial, DEFAULT_DEBOUNCE_DELAY)
    }

    /// Queues `value`, replacing any update still waiting.
    pub fn push(&self, value: T) {
        let state = self.state.clone();
        if let Err(apply) = self.timer.schedule(self.delay, move || state.set(value)) {
            apply();
        }
    }

    /// The settled value.
    pub fn value(&self) -> T {
        self.state.get()
    }

    /// Whether an update is still waiting.
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Drops the waiting update, keeping the settled value.
    pub fn cancel(&self) {
        self.timer.cancel();
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Subscribes to settled values.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }
}
