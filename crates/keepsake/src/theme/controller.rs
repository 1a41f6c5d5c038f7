//! Persisted theme preference with live OS resolution.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use super::preference::{ColorMode, ThemePreference};
use super::scheme::ColorScheme;
use crate::observe::{lock, Listener, State, Subscription};
use crate::slot::Slot;
use crate::store::{Namespace, Storage};

/// Key the preference is stored under in the local namespace.
pub const THEME_PREFERENCE_KEY: &str = "theme-preference";

/// A point-in-time view of a [`ThemeController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeState {
    /// The resolved mode to render with.
    pub theme: ColorMode,
    /// What the user chose.
    pub preference: ThemePreference,
}

struct Inner {
    preference: Slot<ThemePreference>,
    scheme: Option<Arc<dyn ColorScheme>>,
    theme: State<ColorMode>,
    watch: Mutex<Option<Subscription>>,
    resolving: Mutex<()>,
}

impl Inner {
    fn signal(&self) -> Option<bool> {
        self.scheme
            .as_ref()
            .and_then(|scheme| scheme.prefers_dark())
    }

    /// Aligns the OS subscription and the effective theme with the preference.
    fn sync(self: &Arc<Self>) {
        let (preference, released) = {
            let mut watch = lock(&self.watch);
            let preference = self.preference.get();
            let released = match (preference, watch.is_some()) {
                (ThemePreference::System, false) => {
                    *watch = self.watch_scheme();
                    None
                }
                (ThemePreference::System, true) => None,
                (_, _) => watch.take(),
            };
            (preference, released)
        };
        if released.is_some() {
            tracing::trace!(%preference, "stopped watching system color scheme");
        }
        drop(released);

        self.resolve(self.signal());
    }

    fn watch_scheme(self: &Arc<Self>) -> Option<Subscription> {
        let scheme = self.scheme.as_ref()?;
        let weak: Weak<Self> = Arc::downgrade(self);
        let listener: Listener<Option<bool>> = Arc::new(move |prefers_dark| {
            if let Some(inner) = weak.upgrade() {
                inner.on_scheme_change(*prefers_dark);
            }
        });
        tracing::trace!("watching system color scheme");
        Some(scheme.subscribe(listener))
    }

    fn on_scheme_change(&self, prefers_dark: Option<bool>) {
        self.resolve(prefers_dark);
    }

    /// Re-resolves the effective theme from the current preference and
    /// notifies only when it changed. The latest caller always reads the
    /// latest preference.
    fn resolve(&self, prefers_dark: Option<bool>) {
        let changed = {
            let _resolving = lock(&self.resolving);
            let theme = self.preference.get().resolve(prefers_dark);
            if self.theme.get() == theme {
                None
            } else {
                Some(self.theme.replace_with(|_| theme))
            }
        };
        if let Some(theme) = changed {
            self.theme.notify(&theme);
        }
    }

    fn choose(self: &Arc<Self>, preference: ThemePreference) {
        self.preference.set(preference);
        self.sync();
    }
}

/// Tracks a persisted light/dark/system preference and the mode it resolves to.
///
/// The preference lives in a [`Slot`] under [`THEME_PREFERENCE_KEY`] in the
/// local namespace. While it is [`ThemePreference::System`] the controller
/// listens to the color scheme and re-resolves on every change; with an
/// explicit preference it holds no subscription at all. Without a scheme (or
/// when the scheme has no signal) `System` resolves to light.
///
/// Dropping the controller releases its scheme subscription.
///
/// # Example
///
/// ```rust
/// use keepsake::{ColorMode, ManualColorScheme, Storage, ThemeController, ThemePreference};
/// use std::sync::Arc;
///
/// let scheme = Arc::new(ManualColorScheme::new(Some(true)));
/// let controller = ThemeController::new(
///     &Storage::in_memory(),
///     Some(scheme.clone()),
///     ThemePreference::System,
/// );
///
/// assert_eq!(controller.theme(), ColorMode::Dark);
/// controller.toggle(); // system -> dark
/// controller.toggle(); // dark -> light
/// assert_eq!(controller.theme(), ColorMode::Light);
/// ```
pub struct ThemeController {
    inner: Arc<Inner>,
}

impl ThemeController {
    /// Binds the stored preference, falling back to `initial`.
    pub fn new(
        storage: &Storage,
        scheme: Option<Arc<dyn ColorScheme>>,
        initial: ThemePreference,
    ) -> Self {
        let preference = Slot::bind(storage, Namespace::Local, THEME_PREFERENCE_KEY, initial);
        let signal = scheme.as_ref().and_then(|scheme| scheme.prefers_dark());
        let theme = State::new(preference.get().resolve(signal));

        let inner = Arc::new(Inner {
            preference,
            scheme,
            theme,
            watch: Mutex::new(None),
            resolving: Mutex::new(()),
        });
        inner.sync();
        Self { inner }
    }

    /// The effective mode.
    pub fn theme(&self) -> ColorMode {
        self.inner.theme.get()
    }

    /// The stored preference.
    pub fn preference(&self) -> ThemePreference {
        self.inner.preference.get()
    }

    /// Theme and preference read together.
    pub fn snapshot(&self) -> ThemeState {
        ThemeState {
            theme: self.theme(),
            preference: self.preference(),
        }
    }

    /// `system` and `light` go to `dark`, `dark` goes to `light`.
    ///
    /// The flip is computed and stored in one step, so concurrent toggles
    /// never read the same previous preference.
    pub fn toggle(&self) {
        let preference = &self.inner.preference;
        preference.update(|current| current.toggled());
        self.inner.sync();
    }

    /// Stores `dark`.
    pub fn set_dark(&self) {
        self.inner.choose(ThemePreference::Dark);
    }

    /// Stores `light`.
    pub fn set_light(&self) {
        self.inner.choose(ThemePreference::Light);
    }

    /// Stores `system` and starts following the color scheme.
    pub fn set_system(&self) {
        self.inner.choose(ThemePreference::System);
    }

    /// Stores an arbitrary preference.
    pub fn set_preference(&self, preference: ThemePreference) {
        self.inner.choose(preference);
    }

    /// Subscribes to effective-mode changes. Preference changes that leave the
    /// mode unchanged do not notify.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ColorMode) + Send + Sync + 'static,
    {
        self.inner.theme.subscribe(listener)
    }

    /// Whether a color-scheme subscription is currently held.
    pub fn is_watching_system(&self) -> bool {
        lock(&self.inner.watch).is_some()
    }
}

impl fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("theme", &self.theme())
            .field("preference", &self.preference())
            .field("watching_system", &self.is_watching_system())
            .finish()
    }
}
