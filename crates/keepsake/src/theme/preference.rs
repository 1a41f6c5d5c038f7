//! Theme preference and effective color mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The color mode a theme is rendered in. Never "system".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    /// Maps an OS "prefers dark" signal to a mode.
    pub fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ColorMode::Dark
        } else {
            ColorMode::Light
        }
    }

    /// Returns `true` for [`ColorMode::Dark`].
    pub fn is_dark(self) -> bool {
        self == ColorMode::Dark
    }

    /// Lowercase name, as stored and displayed.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The theme the user asked for.
///
/// `System` defers to the OS color scheme. It is stored as `"light"`,
/// `"dark"` or `"system"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    /// The preference after a toggle.
    ///
    /// `System` goes to `Dark`, then `Dark` and `Light` alternate. Toggling
    /// never returns to `System`; only an explicit choice does.
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::System => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
        }
    }

    /// Resolves to a concrete mode.
    ///
    /// `os_prefers_dark` is consulted only for `System`; `None` (no signal)
    /// resolves to light.
    ///
    /// # Example
    ///
    /// ```rust
    /// use keepsake::{ColorMode, ThemePreference};
    ///
    /// assert_eq!(ThemePreference::System.resolve(Some(true)), ColorMode::Dark);
    /// assert_eq!(ThemePreference::System.resolve(None), ColorMode::Light);
    /// assert_eq!(ThemePreference::Light.resolve(Some(true)), ColorMode::Light);
    /// ```
    pub fn resolve(self, os_prefers_dark: Option<bool>) -> ColorMode {
        match self {
            ThemePreference::Light => ColorMode::Light,
            ThemePreference::Dark => ColorMode::Dark,
            ThemePreference::System => {
                os_prefers_dark.map_or(ColorMode::Light, ColorMode::from_prefers_dark)
            }
        }
    }

    /// Lowercase name, as stored and displayed.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ColorMode> for ThemePreference {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => ThemePreference::Light,
            ColorMode::Dark => ThemePreference::Dark,
        }
    }
}

/// Error returned when parsing an unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme '{0}', expected 'light', 'dark' or 'system'")]
pub struct ParseThemeError(pub String);

impl FromStr for ThemePreference {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            _ => Err(ParseThemeError(s.to_string())),
        }
    }
}

impl FromStr for ColorMode {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<ThemePreference>()? {
            ThemePreference::Light => Ok(ColorMode::Light),
            ThemePreference::Dark => Ok(ColorMode::Dark),
            ThemePreference::System => Err(ParseThemeError(s.to_string())),
        }
    }
}
