//! Storage configuration.
//!
//! A [`Config`] describes which backend serves each namespace. It can be
//! built in code or loaded from YAML:
//!
//! ```yaml
//! app: my-app
//! local:
//!   backend: file          # memory | file | disabled
//!   path: ./state.json     # optional, defaults to <data dir>/<app>/local-storage.json
//!   quota_bytes: 5242880
//! session:
//!   backend: memory
//! ```
//!
//! Missing sections take the defaults: a durable file store for `local`, a
//! memory store for `session`, 5 MiB quota each.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::{FileStore, MemoryStore, Namespace, Storage, Store, StoreError};

/// Per-namespace quota used when none is configured, as in common browsers.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Application name used for the default data directory.
pub const DEFAULT_APP_NAME: &str = "keepsake";

/// Error returned when loading a configuration or opening its stores.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("no data directory on this platform; set an explicit path for the {0} namespace")]
    NoDataDir(Namespace),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where a namespace keeps its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    File,
    Disabled,
}

/// Settings for one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub backend: Backend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// `None` means unbounded.
    #[serde(default = "default_quota")]
    pub quota_bytes: Option<usize>,
}

fn default_quota() -> Option<usize> {
    Some(DEFAULT_QUOTA_BYTES)
}

impl BackendConfig {
    /// In-memory backend with the default quota.
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            path: None,
            quota_bytes: default_quota(),
        }
    }

    /// File backend; `None` uses the default data path.
    pub fn file(path: Option<PathBuf>) -> Self {
        Self {
            backend: Backend::File,
            path,
            quota_bytes: default_quota(),
        }
    }

    /// No store; the namespace behaves as unavailable.
    pub fn disabled() -> Self {
        Self {
            backend: Backend::Disabled,
            path: None,
            quota_bytes: None,
        }
    }

    /// Replaces the quota. `None` means unbounded.
    pub fn quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    fn open(&self, app: &str, namespace: Namespace) -> Result<Option<Arc<dyn Store>>, ConfigError> {
        let store: Arc<dyn Store> = match self.backend {
            Backend::Disabled => return Ok(None),
            Backend::Memory => match self.quota_bytes {
                Some(quota) => Arc::new(MemoryStore::with_quota(quota)),
                None => Arc::new(MemoryStore::new()),
            },
            Backend::File => {
                let path = match &self.path {
                    Some(path) => path.clone(),
                    None => FileStore::default_path(app)
                        .ok_or(ConfigError::NoDataDir(namespace))?,
                };
                Arc::new(FileStore::open_with_quota(path, self.quota_bytes)?)
            }
        };
        tracing::debug!(%namespace, backend = ?self.backend, "opened store");
        Ok(Some(store))
    }
}

/// Backends for both namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Names the default data directory for file stores.
    pub app: String,
    pub local: BackendConfig,
    pub session: BackendConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: DEFAULT_APP_NAME.to_string(),
            local: BackendConfig::file(None),
            session: BackendConfig::memory(),
        }
    }
}

impl Config {
    /// Both namespaces in memory; nothing touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            local: BackendConfig::memory(),
            ..Self::default()
        }
    }

    /// Parses YAML. Blank input yields the default configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Settings for `namespace`.
    pub fn backend(&self, namespace: Namespace) -> &BackendConfig {
        match namespace {
            Namespace::Local => &self.local,
            Namespace::Session => &self.session,
        }
    }

    /// Opens the configured stores.
    pub fn build_storage(&self) -> Result<Storage, ConfigError> {
        let local = self.local.open(&self.app, Namespace::Local)?;
        let session = self.session.open(&self.app, Namespace::Session)?;
        Ok(Storage::new(local, session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.local.backend, Backend::File);
        assert_eq!(config.session.backend, Backend::Memory);
        assert_eq!(config.session.quota_bytes, Some(DEFAULT_QUOTA_BYTES));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml_str("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml_str(
            r#"
app: demo
session:
  backend: disabled
"#,
        )
        .unwrap();

        assert_eq!(config.app, "demo");
        assert_eq!(config.local, BackendConfig::file(None));
        assert_eq!(config.session.backend, Backend::Disabled);
    }

    #[test]
    fn test_quota_can_be_unbounded() {
        let config = Config::from_yaml_str(
            r#"
local:
  backend: memory
  quota_bytes: null
"#,
        )
        .unwrap();
        assert_eq!(config.local.quota_bytes, None);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let err = Config::from_yaml_str("local:\n  backend: cookie\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_build_in_memory_storage() {
        let storage = Config::in_memory().build_storage().unwrap();
        assert!(storage.is_available(Namespace::Local));
        assert!(storage.is_available(Namespace::Session));
    }

    #[test]
    fn test_disabled_namespace_has_no_store() {
        let config = Config {
            session: BackendConfig::disabled(),
            ..Config::in_memory()
        };
        let storage = config.build_storage().unwrap();
        assert!(!storage.is_available(Namespace::Session));
    }

    #[test]
    fn test_file_backend_uses_configured_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.json");
        let config = Config {
            local: BackendConfig::file(Some(path.clone())),
            ..Config::default()
        };

        let storage = config.build_storage().unwrap();
        storage
            .store(Namespace::Local)
            .unwrap()
            .set("k", "1")
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_memory_quota_is_applied() {
        let config = Config {
            local: BackendConfig::memory().quota(Some(4)),
            ..Config::in_memory()
        };
        let storage = config.build_storage().unwrap();
        assert!(storage
            .store(Namespace::Local)
            .unwrap()
            .set("key", "value")
            .is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keepsake.yaml");
        fs::write(&path, "app: from-file\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().app, "from-file");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("here.yaml"));
    }
}
