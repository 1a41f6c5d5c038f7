//! Call throttling.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::observe::lock;

/// Accepts at most one call per `delay`.
///
/// The first call always runs; later calls run only once `delay` has passed
/// since the last call that ran. Rejected calls are dropped, not queued.
///
/// # Example
///
/// ```rust
/// use keepsake::Throttle;
/// use std::time::Duration;
///
/// let throttle = Throttle::new(Duration::from_secs(60));
/// let mut hits = 0;
/// assert!(throttle.call(|| hits += 1));
/// assert!(!throttle.call(|| hits += 1));
/// assert_eq!(hits, 1);
/// ```
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Allows at most one call per `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    /// Runs `f` if the throttle is open. Returns whether it ran.
    pub fn call(&self, f: impl FnOnce()) -> bool {
        let now = Instant::now();
        {
            let mut last = lock(&self.last);
            if let Some(previous) = *last {
                if now.duration_since(previous) < self.delay {
                    return false;
                }
            }
            *last = Some(now);
        }
        f();
        true
    }

    /// Wraps `f` in a closure that goes through this throttle.
    pub fn wrap<A, F>(self, f: F) -> impl Fn(A) -> bool
    where
        F: Fn(A),
    {
        move |arg| self.call(|| f(arg))
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
