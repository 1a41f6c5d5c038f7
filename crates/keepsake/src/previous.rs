//! Previous-value tracking.

/// Remembers the value seen on the previous call.
///
/// # Example
///
/// ```rust
/// use keepsake::Previous;
///
/// let mut previous = Previous::new();
/// assert_eq!(previous.track(1), None);
/// assert_eq!(previous.track(2), Some(1));
/// assert_eq!(previous.get(), Some(&2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Previous<T> {
    last: Option<T>,
}

impl<T: Clone> Previous<T> {
    /// Creates a tracker that has seen nothing yet.
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Records `value` and returns the one recorded before it.
    pub fn track(&mut self, value: T) -> Option<T> {
        self.last.replace(value)
    }

    /// The most recently recorded value.
    pub fn get(&self) -> Option<&T> {
        self.last.as_ref()
    }
}
