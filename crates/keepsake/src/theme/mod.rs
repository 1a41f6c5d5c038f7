//! Theme preference tracking.
//!
//! This module provides:
//!
//! - [`ThemePreference`]: light, dark or follow-the-system, as the user chose it
//! - [`ColorMode`]: the light or dark mode a preference resolves to
//! - [`ColorScheme`]: a source of the OS "prefers dark" signal, with
//!   [`ManualColorScheme`] for host-fed signals and [`SystemColorScheme`] for
//!   the operating system setting
//! - [`ThemeController`]: a persisted preference plus the live effective mode
//!
//! The preference has three states but toggling only moves between light and
//! dark. Going back to `System` always takes an explicit
//! [`ThemeController::set_system`].

mod controller;
mod preference;
mod scheme;

pub use controller::{ThemeController, ThemeState, THEME_PREFERENCE_KEY};
pub use preference::{ColorMode, ParseThemeError, ThemePreference};
pub use scheme::{
    reset_theme_detector, set_theme_detector, ColorScheme, ManualColorScheme, SystemColorScheme,
};
