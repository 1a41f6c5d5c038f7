//! Inactivity detection.

use std::time::Duration;

use super::Deferred;
use crate::observe::{State, Subscription};

/// Timeout used by [`IdleTimer::with_default_timeout`].
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Reports idle once `timeout` passes without activity.
///
/// The host feeds activity (input events, requests, whatever counts as "busy")
/// through [`activity`](IdleTimer::activity). Outside a tokio runtime the timer
/// never reports idle.
#[derive(Debug)]
pub struct IdleTimer {
    timeout: Duration,
    idle: State<bool>,
    timer: Deferred,
}

impl IdleTimer {
    /// Creates the timer and starts the first countdown.
    pub fn start(timeout: Duration) -> Self {
        let timer = Self {
            timeout,
            idle: State::new(false),
            timer: Deferred::new(),
        };
        timer.reset();
        timer
    }

    /// Starts a timer with the default timeout.
    pub fn with_default_timeout() -> Self {
        Self::start(DEFAULT_IDLE_TIMEOUT)
    }

    /// Clears idle and restarts the countdown.
    pub fn reset(&self) {
        if self.idle.get() {
            self.idle.set(false);
        }
        let idle = self.idle.clone();
        let scheduled = self.timer.schedule(self.timeout, move || idle.set(true));
        if scheduled.is_err() {
            tracing::debug!("no async runtime, idle detection disabled");
        }
    }

    /// Records activity. Same as [`reset`](IdleTimer::reset).
    pub fn activity(&self) {
        self.reset();
    }

    /// Whether the timeout elapsed since the last activity.
    pub fn is_idle(&self) -> bool {
        self.idle.get()
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Subscribes to idle/active transitions.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.idle.subscribe(listener)
    }
}
