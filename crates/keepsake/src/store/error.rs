//! Storage errors.

use std::path::PathBuf;

/// Error returned by a [`Store`](super::Store) operation.
///
/// Hooks never surface these; they are logged and replaced by a safe default.
/// They are visible to code that drives a store directly.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write would push the store past its byte quota.
    #[error("writing '{key}' needs {needed} bytes but the store quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    /// The backing file could not be read or written.
    #[error("storage file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backing file does not hold a JSON object of strings.
    #[error("storage file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The store cannot be used in this environment.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
