//! # Keepsake - persistent reactive state for native applications
//!
//! Keepsake keeps small pieces of application state (preferences, toggles,
//! counters, draft values) in typed slots that survive restarts, and tells
//! interested parties when they change.
//!
//! ## Core Concepts
//!
//! - [`Storage`]: the persistence environment, one [`Store`] per [`Namespace`]
//!   (`local` survives restarts, `session` lasts as long as the process)
//! - [`Slot`]: a typed value bound to one key, written through to its store
//!   on every change
//! - [`ThemeController`]: a persisted light/dark/system preference resolved
//!   against a live [`ColorScheme`] signal
//! - [`State`] and [`Subscription`]: the change-notification layer everything
//!   else is built on
//!
//! ## Never Failing
//!
//! Hooks never return errors. A missing store, an unreadable entry, corrupt
//! JSON or a full quota all degrade to the caller's default value, and failed
//! writes keep the new value in memory. Failures are reported through
//! [`tracing`] at `debug` level. Errors surface only where a caller opens
//! stores explicitly ([`FileStore::open`], [`Config::build_storage`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use keepsake::{use_dark_mode, use_local_storage, ColorMode, ManualColorScheme};
//! use keepsake::{Storage, ThemePreference};
//! use std::sync::Arc;
//!
//! let storage = Storage::in_memory();
//!
//! let name = use_local_storage(&storage, "name", String::from("anonymous"));
//! name.set("ada".into());
//!
//! let scheme = Arc::new(ManualColorScheme::new(Some(false)));
//! let theme = use_dark_mode(&storage, Some(scheme.clone()), ThemePreference::System);
//! assert_eq!(theme.theme(), ColorMode::Light);
//!
//! scheme.set_prefers_dark(true);
//! assert_eq!(theme.theme(), ColorMode::Dark);
//! ```
//!
//! ## Configuration
//!
//! [`Config`] selects a backend per namespace (file, memory or disabled) and
//! can be loaded from YAML. See the [`config`] module.

pub mod config;
mod counter;
mod observe;
mod previous;
mod slot;
pub mod store;
pub mod theme;
pub mod timing;
mod toggle;

use std::sync::Arc;

pub use config::{Backend, BackendConfig, Config, ConfigError, DEFAULT_QUOTA_BYTES};
pub use counter::{Counter, CounterOptions};
pub use observe::{Listener, Listeners, State, Subscription};
pub use previous::Previous;
pub use slot::{Slot, SlotValue, Update};
pub use store::{FileStore, MemoryStore, Namespace, Storage, Store, StoreError};
pub use theme::{
    reset_theme_detector, set_theme_detector, ColorMode, ColorScheme, ManualColorScheme,
    SystemColorScheme, ThemeController, ThemePreference, ThemeState, THEME_PREFERENCE_KEY,
};
pub use timing::{Debounced, Deferred, IdleTimer, Throttle};
pub use toggle::Toggle;

/// Binds `key` in the durable `local` namespace.
pub fn use_local_storage<T: SlotValue>(storage: &Storage, key: &str, initial: T) -> Slot<T> {
    Slot::bind(storage, Namespace::Local, key, initial)
}

/// Binds `key` in the process-lifetime `session` namespace.
pub fn use_session_storage<T: SlotValue>(storage: &Storage, key: &str, initial: T) -> Slot<T> {
    Slot::bind(storage, Namespace::Session, key, initial)
}

/// Creates a [`ThemeController`] over the stored `theme-preference`.
pub fn use_dark_mode(
    storage: &Storage,
    scheme: Option<Arc<dyn ColorScheme>>,
    initial: ThemePreference,
) -> ThemeController {
    ThemeController::new(storage, scheme, initial)
}
