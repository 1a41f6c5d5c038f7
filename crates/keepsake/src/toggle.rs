//! Boolean on/off state.

use crate::observe::{State, Subscription};

/// A shared boolean with toggle and explicit on/off setters.
///
/// # Example
///
/// ```rust
/// use keepsake::Toggle;
///
/// let open = Toggle::new(false);
/// open.toggle();
/// assert!(open.value());
/// open.set_false();
/// assert!(!open.value());
/// ```
#[derive(Debug, Clone)]
pub struct Toggle {
    state: State<bool>,
}

impl Toggle {
    /// Creates a toggle starting at `initial`.
    pub fn new(initial: bool) -> Self {
        Self {
            state: State::new(initial),
        }
    }

    /// Current state.
    pub fn value(&self) -> bool {
        self.state.get()
    }

    /// Flips the value, returning the new one.
    pub fn toggle(&self) -> bool {
        self.state.update(|value| !value)
    }

    /// Switches on.
    pub fn set_true(&self) {
        self.state.set(true);
    }

    /// Switches off.
    pub fn set_false(&self) {
        self.state.set(false);
    }

    /// Sets the state directly.
    pub fn set(&self, value: bool) {
        self.state.set(value);
    }

    /// Subscribes to state changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }
}

impl Default for Toggle {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_toggle_defaults_to_false() {
        assert!(!Toggle::default().value());
    }

    #[test]
    fn test_toggle_flips() {
        let toggle = Toggle::new(true);
        assert!(!toggle.toggle());
        assert!(toggle.toggle());
    }

    #[test]
    fn test_setters() {
        let toggle = Toggle::new(false);
        toggle.set_true();
        assert!(toggle.value());
        toggle.set_true();
        assert!(toggle.value());
        toggle.set_false();
        assert!(!toggle.value());
        toggle.set(true);
        assert!(toggle.value());
    }

    #[test]
    fn test_toggle_notifies() {
        let toggle = Toggle::new(false);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _guard = toggle.subscribe(move |v| sink.lock().unwrap().push(*v));

        toggle.toggle();
        toggle.set_false();

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }
}
