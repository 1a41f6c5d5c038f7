//! Durable store backed by a JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::memory::Entries;
use super::{Store, StoreError};
use crate::observe::lock;

/// File name used under the per-application data directory.
pub const DEFAULT_FILE_NAME: &str = "local-storage.json";

/// A store that persists every entry to a single JSON object file.
///
/// The file is read once when the store is opened. Each write updates the
/// in-memory map and rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written file behind. Two processes
/// writing the same file follow last-write-wins.
///
/// # Example
///
/// ```rust
/// use keepsake::{FileStore, Store};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("store.json");
///
/// let store = FileStore::open(&path).unwrap();
/// store.set("greeting", "\"hello\"").unwrap();
///
/// let reopened = FileStore::open(&path).unwrap();
/// assert_eq!(reopened.get("greeting").unwrap().as_deref(), Some("\"hello\""));
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_quota(path, None)
    }

    /// Opens the store at `path`, rejecting writes past `quota` bytes.
    pub fn open_with_quota(
        path: impl AsRef<Path>,
        quota: Option<usize>,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let map = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), entries = map.len(), "opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(Entries::from_map(map, quota)),
        })
    }

    /// `<data dir>/<app>/local-storage.json`, or `None` when the platform has
    /// no data directory.
    pub fn default_path(app: &str) -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(app).join(DEFAULT_FILE_NAME))
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let text =
            serde_json::to_string_pretty(entries.map()).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(|source| {
            if let Err(err) = fs::remove_file(&tmp) {
                tracing::debug!(
                    path = %tmp.display(),
                    error = %err,
                    "failed to remove temp file"
                );
            }
            io_err(source)
        })
    }

    /// Applies `change` to a copy of the entries and commits it only if the
    /// file write succeeds.
    fn write_with(
        &self,
        change: impl FnOnce(&mut Entries) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut guard = lock(&self.entries);
        let mut next = guard.clone();
        change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write_with(|entries| entries.insert(key, value))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.write_with(|entries| {
            entries.remove(key);
            Ok(())
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.write_with(|entries| {
            entries.clear();
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(lock(&self.entries).map().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_open_empty_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "").unwrap();
        assert!(FileStore::open(&path).unwrap().keys().unwrap().is_empty());
    }

    #[test]
    fn test_open_corrupt_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_quota_failure_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open_with_quota(&path, Some(6)).unwrap();
        store.set("k", "ok").unwrap();
        assert!(store.set("k", "too long").is_err());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("ok"));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();

        // A non-empty directory in the file's place makes the rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupant"), "x").unwrap();

        assert!(matches!(store.set("k", "v"), Err(StoreError::Io { .. })));
        assert!(!dir.path().join("store.json.tmp").exists());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_clear_empties_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.set("k", "v").unwrap();
        store.clear().unwrap();
        assert!(FileStore::open(&path).unwrap().keys().unwrap().is_empty());
    }

    #[test]
    fn test_default_path_uses_app_dir() {
        if let Some(path) = FileStore::default_path("keepsake-test") {
            assert!(path.ends_with(Path::new("keepsake-test").join(DEFAULT_FILE_NAME)));
        }
    }
}
