//! Timer-driven helpers.
//!
//! - [`Deferred`]: a single cancellable pending callback
//! - [`Debounced`]: a value that settles only after updates stop
//! - [`Throttle`]: at most one accepted call per interval
//! - [`IdleTimer`]: reports inactivity after a timeout
//!
//! Timers run on the ambient tokio runtime. Outside a runtime nothing is
//! scheduled and each helper falls back to a static behavior (documented on
//! the type) instead of panicking.

mod debounce;
mod idle;
mod throttle;

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::observe::lock;

pub use debounce::{Debounced, DEFAULT_DEBOUNCE_DELAY};
pub use idle::{IdleTimer, DEFAULT_IDLE_TIMEOUT};
pub use throttle::Throttle;

/// One pending callback at a time.
///
/// Scheduling replaces (and cancels) whatever was pending. Dropping the guard
/// cancels the pending callback, so nothing fires after its owner is gone.
#[derive(Default)]
pub struct Deferred {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Deferred {
    /// Creates a handle with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` after `delay` on the current tokio runtime.
    ///
    /// Hands `f` back when there is no runtime to schedule it on.
    pub fn schedule<F>(&self, delay: Duration, f: F) -> Result<(), F>
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            return Err(f);
        };
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        });
        if let Some(previous) = lock(&self.pending).replace(task) {
            previous.abort();
        }
        Ok(())
    }

    /// Cancels the pending callback, if any.
    pub fn cancel(&self) {
        if let Some(task) = lock(&self.pending).take() {
            task.abort();
        }
    }

    /// Whether a callback is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Deferred {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("pending", &self.is_pending())
            .finish()
    }
}
