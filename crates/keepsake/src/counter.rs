//! Bounded numeric counter.

use serde::{Deserialize, Serialize};

use crate::observe::{State, Subscription};

/// Settings for a [`Counter`].
///
/// Deserializes from configuration; missing fields take the defaults
/// (start at 0, step 1, unbounded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterOptions {
    pub initial: i64,
    pub step: i64,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Default for CounterOptions {
    fn default() -> Self {
        Self {
            initial: 0,
            step: 1,
            min: None,
            max: None,
        }
    }
}

impl CounterOptions {
    /// Options starting at `initial` with a step of one and no bounds.
    pub fn new(initial: i64) -> Self {
        Self {
            initial,
            ..Self::default()
        }
    }

    /// Sets the increment.
    pub fn step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    /// Sets the lower bound.
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the upper bound.
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

/// A counter with increment, decrement, reset and clamped assignment.
///
/// `increment` is capped at `max` and `decrement` at `min`; `set_value`
/// clamps to both. The initial value itself is not clamped, and `reset`
/// returns to it unchanged.
///
/// # Example
///
/// ```rust
/// use keepsake::{Counter, CounterOptions};
///
/// let counter = Counter::new(CounterOptions::new(5).min(0).max(10));
/// counter.set_value(15);
/// assert_eq!(counter.count(), 10);
/// counter.reset();
/// assert_eq!(counter.count(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Counter {
    options: CounterOptions,
    state: State<i64>,
}

impl Counter {
    /// Creates a counter at `options.initial`.
    pub fn new(options: CounterOptions) -> Self {
        Self {
            state: State::new(options.initial),
            options,
        }
    }

    /// Current count.
    pub fn count(&self) -> i64 {
        self.state.get()
    }

    /// The options this counter was built with.
    pub fn options(&self) -> CounterOptions {
        self.options
    }

    /// Adds one step, capped at `max`. Returns the new count.
    pub fn increment(&self) -> i64 {
        let CounterOptions { step, max, .. } = self.options;
        self.state.update(|count| {
            let next = count.saturating_add(step);
            max.map_or(next, |max| next.min(max))
        })
    }

    /// Subtracts one step, capped at `min`. Returns the new count.
    pub fn decrement(&self) -> i64 {
        let CounterOptions { step, min, .. } = self.options;
        self.state.update(|count| {
            let next = count.saturating_sub(step);
            min.map_or(next, |min| next.max(min))
        })
    }

    /// Returns to the initial value.
    pub fn reset(&self) {
        self.state.set(self.options.initial);
    }

    /// Assigns `value`, clamped to the configured bounds.
    pub fn set_value(&self, value: i64) {
        let mut next = value;
        if let Some(min) = self.options.min {
            next = next.max(min);
        }
        if let Some(max) = self.options.max {
            next = next.min(max);
        }
        self.state.set(next);
    }

    /// Subscribes to count changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&i64) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(CounterOptions::default())
    }
}
