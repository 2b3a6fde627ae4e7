//! Durable key/value persistence for session state.
//!
//! # Design
//! - Synchronous, write-through: a mutation is on disk (or in `localStorage`) before the
//!   store method returns, so a reload at any point observes the latest value.
//! - Values are opaque strings; callers own the document shape.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// File name used by [`FileStore`] inside its state directory.
pub const STATE_FILE_NAME: &str = "session.json";

/// Minimal key/value persistence contract.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries, as if restored from a previous run.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// File-backed store keeping every key in one JSON object.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store state in `dir/session.json`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STATE_FILE_NAME),
        }
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    operation: "read",
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&raw).map_err(|source| StorageError::Json {
            key: self.path.display().to_string(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                operation: "create_dir",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_vec_pretty(entries).map_err(|source| StorageError::Json {
            key: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, text).map_err(|source| StorageError::Io {
            operation: "write",
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn memory_store_round_trips_and_removes() -> Result<()> {
        let store = MemoryStore::with_entries([("token", r#"{"token":"abc"}"#)]);
        assert_eq!(
            store.load("token")?.as_deref(),
            Some(r#"{"token":"abc"}"#)
        );
        store.remove("token")?;
        store.remove("token")?;
        assert_eq!(store.load("token")?, None);
        Ok(())
    }

    #[test]
    fn file_store_survives_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::in_dir(dir.path().join("nested"));
        assert_eq!(store.load("token")?, None);
        store.save("token", "one")?;
        store.save("userInfo", "{}")?;

        let reopened = FileStore::in_dir(dir.path().join("nested"));
        assert_eq!(reopened.load("token")?.as_deref(), Some("one"));
        reopened.remove("token")?;
        assert_eq!(store.load("token")?, None);
        assert_eq!(store.load("userInfo")?.as_deref(), Some("{}"));
        Ok(())
    }

    #[test]
    fn file_store_reports_corrupt_documents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::in_dir(dir.path());
        fs::write(store.path(), "not json")?;
        let err = store.load("token").err();
        assert!(matches!(err, Some(StorageError::Json { .. })));
        Ok(())
    }
}
