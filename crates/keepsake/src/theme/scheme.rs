//! OS color-scheme signals.

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

use super::preference::ColorMode;
use crate::observe::{lock, Listener, State, Subscription};

/// A source of the OS "prefers dark color scheme" signal.
///
/// `prefers_dark` returns `None` when the signal is unavailable, such as in a
/// headless environment. Listeners receive the new signal each time it
/// changes.
pub trait ColorScheme: Send + Sync {
    /// Current signal.
    fn prefers_dark(&self) -> Option<bool>;

    /// Subscribes to signal changes.
    fn subscribe(&self, listener: Listener<Option<bool>>) -> Subscription;
}

/// A color-scheme signal fed by the host application.
///
/// Bridges whatever change notification the platform offers (a media query
/// listener, a settings portal, a test) into the crate's observers.
///
/// # Example
///
/// ```rust
/// use keepsake::{ColorScheme, ManualColorScheme};
///
/// let scheme = ManualColorScheme::new(Some(false));
/// scheme.set_prefers_dark(true);
/// assert_eq!(scheme.prefers_dark(), Some(true));
/// ```
#[derive(Debug, Clone)]
pub struct ManualColorScheme {
    signal: State<Option<bool>>,
}

impl ManualColorScheme {
    /// Creates a signal with the given starting value.
    pub fn new(prefers_dark: Option<bool>) -> Self {
        Self {
            signal: State::new(prefers_dark),
        }
    }

    /// Publishes a new signal. Listeners run only when it differs.
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        self.publish(Some(prefers_dark));
    }

    /// Marks the signal as unavailable.
    pub fn clear(&self) {
        self.publish(None);
    }

    /// Number of live subscriptions, for checking teardown.
    pub fn listener_count(&self) -> usize {
        self.signal.listener_count()
    }

    fn publish(&self, next: Option<bool>) {
        if self.signal.get() != next {
            self.signal.set(next);
        }
    }
}

impl Default for ManualColorScheme {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ColorScheme for ManualColorScheme {
    fn prefers_dark(&self) -> Option<bool> {
        self.signal.get()
    }

    fn subscribe(&self, listener: Listener<Option<bool>>) -> Subscription {
        self.signal.subscribe(move |signal| listener(signal))
    }
}

type ThemeDetector = fn() -> Option<ColorMode>;

static THEME_DETECTOR: Lazy<Mutex<ThemeDetector>> = Lazy::new(|| Mutex::new(os_theme_detector));

/// Overrides the detector used to read the OS color scheme.
///
/// This is useful for testing or when you want to force a specific color mode.
/// Returning `None` simulates an environment without the signal.
pub fn set_theme_detector(detector: ThemeDetector) {
    *lock(&*THEME_DETECTOR) = detector;
}

/// Restores the detector that asks the operating system.
pub fn reset_theme_detector() {
    set_theme_detector(os_theme_detector);
}

fn detect_color_mode() -> Option<ColorMode> {
    let detector = *lock(&*THEME_DETECTOR);
    detector()
}

fn os_theme_detector() -> Option<ColorMode> {
    match detect_os_theme() {
        OsThemeMode::Dark => Some(ColorMode::Dark),
        OsThemeMode::Light => Some(ColorMode::Light),
    }
}

/// The operating system's color scheme.
///
/// The setting is read when the source is created and again on each
/// [`refresh`](SystemColorScheme::refresh). Hosts call `refresh` when the
/// platform reports a settings change (or on a timer); listeners run only if
/// the reading changed.
#[derive(Debug, Clone)]
pub struct SystemColorScheme {
    signal: State<Option<bool>>,
}

impl SystemColorScheme {
    /// Reads the OS setting through the current detector.
    pub fn new() -> Self {
        Self {
            signal: State::new(read_signal()),
        }
    }

    /// Shared handle, ready to hand to a [`ThemeController`](super::ThemeController).
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Re-reads the OS setting. Returns `true` when it changed.
    pub fn refresh(&self) -> bool {
        let next = read_signal();
        if self.signal.get() == next {
            return false;
        }
        tracing::debug!(prefers_dark = ?next, "system color scheme changed");
        self.signal.set(next);
        true
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.signal.listener_count()
    }
}

impl Default for SystemColorScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorScheme for SystemColorScheme {
    fn prefers_dark(&self) -> Option<bool> {
        self.signal.get()
    }

    fn subscribe(&self, listener: Listener<Option<bool>>) -> Subscription {
        self.signal.subscribe(move |signal| listener(signal))
    }
}

fn read_signal() -> Option<bool> {
    detect_color_mode().map(ColorMode::is_dark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener() -> (Arc<AtomicUsize>, Listener<Option<bool>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let listener: Listener<Option<bool>> = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (calls, listener)
    }

    #[test]
    fn test_manual_scheme_notifies_only_on_change() {
        let scheme = ManualColorScheme::new(Some(false));
        let (calls, listener) = counting_listener();
        let _guard = scheme.subscribe(listener);

        scheme.set_prefers_dark(false);
        scheme.set_prefers_dark(true);
        scheme.set_prefers_dark(true);
        scheme.clear();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(scheme.prefers_dark(), None);
    }

    #[test]
    fn test_manual_scheme_teardown() {
        let scheme = ManualColorScheme::default();
        let (calls, listener) = counting_listener();
        let guard = scheme.subscribe(listener);
        assert_eq!(scheme.listener_count(), 1);

        drop(guard);
        scheme.set_prefers_dark(true);

        assert_eq!(scheme.listener_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    #[serial]
    fn test_system_scheme_uses_detector() {
        set_theme_detector(|| Some(ColorMode::Dark));
        let scheme = SystemColorScheme::new();
        assert_eq!(scheme.prefers_dark(), Some(true));

        set_theme_detector(|| None);
        assert_eq!(SystemColorScheme::new().prefers_dark(), None);

        reset_theme_detector();
    }

    #[test]
    #[serial]
    fn test_system_scheme_refresh_reports_changes() {
        set_theme_detector(|| Some(ColorMode::Light));
        let scheme = SystemColorScheme::new();
        let (calls, listener) = counting_listener();
        let _guard = scheme.subscribe(listener);

        assert!(!scheme.refresh());

        set_theme_detector(|| Some(ColorMode::Dark));
        assert!(scheme.refresh());
        assert_eq!(scheme.prefers_dark(), Some(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        reset_theme_detector();
    }
}
