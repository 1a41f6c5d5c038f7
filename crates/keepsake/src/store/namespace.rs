//! Persistence namespaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A persistence scope with its own key space.
///
/// `Local` outlives the session; `Session` is dropped when the session ends.
/// The same key string in the two namespaces names two unrelated entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Local,
    Session,
}

impl Namespace {
    /// The lowercase name used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Local => "local",
            Namespace::Session => "session",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown namespace name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown namespace '{0}', expected 'local' or 'session'")]
pub struct ParseNamespaceError(pub String);

impl FromStr for Namespace {
    type Err = ParseNamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Namespace::Local),
            "session" => Ok(Namespace::Session),
            _ => Err(ParseNamespaceError(s.to_string())),
        }
    }
}
