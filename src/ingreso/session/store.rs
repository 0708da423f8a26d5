//! Key-value persistence for session records.
//!
//! `Storage` mirrors the browser storage surface (string keys, string values);
//! `SessionStore` layers JSON encoding and the `session_{id}` key scheme on top.
//! Reads never fail: a missing key, an unreadable file and a value that does not
//! parse as the requested type are all reported as `None`.

use super::id::SessionId;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use thiserror::Error;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "session_";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("session storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Raw string storage, scoped to whatever lifetime the backend provides.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Overwrites any existing value.
    ///
    /// # Errors
    /// Returns an error if the backend cannot persist the value.
    fn set_item(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backend cannot delete an existing value.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-lifetime storage, the equivalent of a browser tab's session storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory. Lets a kiosk resume a workflow
/// after a restart by its `sid`.
#[derive(Debug, Clone)]
pub struct DirStorage {
    dir: PathBuf,
}

impl DirStorage {
    /// Opens (and creates if needed) the storage directory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        safe.then(|| self.dir.join(format!("{key}.json")))
    }
}

impl Storage for DirStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("Failed to read {}: {err}", path.display());
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let Some(path) = self.path_for(key) else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// JSON session records addressed by session id.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn key(id: &SessionId) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    /// Serializes `record` and writes it under `session_{id}`, replacing any
    /// previous value. No shape validation is applied.
    ///
    /// # Errors
    /// Returns an error if the value cannot be encoded or persisted.
    pub fn put<T: Serialize + ?Sized>(&self, id: &SessionId, record: &T) -> Result<(), StoreError> {
        let value = serde_json::to_string(record)?;
        self.storage.set_item(&Self::key(id), value)
    }

    /// Reads and decodes the value under `session_{id}`. Missing and malformed
    /// values are both `None`.
    pub fn get<T: DeserializeOwned>(&self, id: &SessionId) -> Option<T> {
        let raw = self.storage.get_item(&Self::key(id))?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!("Discarding unreadable session {id}: {err}");
                None
            }
        }
    }

    /// Deletes the record; idempotent.
    ///
    /// # Errors
    /// Returns an error if the backend fails to delete an existing value.
    pub fn remove(&self, id: &SessionId) -> Result<(), StoreError> {
        self.storage.remove_item(&Self::key(id))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sid(raw: &str) -> SessionId {
        SessionId::parse(raw).unwrap()
    }

    #[test]
    fn get_returns_what_put_stored() {
        let store = SessionStore::new(MemoryStorage::new());
        let record = json!({
            "dni": "0209200500236",
            "roles": ["student", "employee"],
            "nested": { "active": true, "count": 3, "none": null }
        });

        store.put(&sid("abc"), &record).unwrap();

        assert_eq!(store.get::<Value>(&sid("abc")), Some(record));
        assert!(
            store.storage().get_item("session_abc").is_some(),
            "key must use the session_ prefix"
        );
    }

    #[test]
    fn put_overwrites() {
        let store = SessionStore::new(MemoryStorage::new());
        store.put(&sid("k"), &json!({"v": 1})).unwrap();
        store.put(&sid("k"), &json!({"v": 2})).unwrap();
        assert_eq!(store.get::<Value>(&sid("k")), Some(json!({"v": 2})));
        assert_eq!(store.storage().len(), 1);
    }

    #[test]
    fn malformed_json_is_absent() {
        let store = SessionStore::new(MemoryStorage::new());
        store
            .storage()
            .set_item("session_bad", "{not json".to_string())
            .unwrap();
        assert_eq!(store.get::<Value>(&sid("bad")), None);
    }

    #[test]
    fn wrong_shape_is_absent() {
        #[derive(serde::Deserialize)]
        #[allow(dead_code)]
        struct Shape {
            required: u32,
        }

        let store = SessionStore::new(MemoryStorage::new());
        store.put(&sid("s"), &json!({"other": "x"})).unwrap();
        assert!(store.get::<Shape>(&sid("s")).is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let store = SessionStore::new(MemoryStorage::new());
        store.put(&sid("gone"), &json!(1)).unwrap();
        store.remove(&sid("gone")).unwrap();
        store.remove(&sid("gone")).unwrap();
        assert!(store.get::<Value>(&sid("gone")).is_none());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn dir_storage_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(DirStorage::new(dir.path()).unwrap());
        let record = json!({"name": "Ana López", "photo": "data:image/jpeg;base64,AAAA"});

        store.put(&sid("file1"), &record).unwrap();
        assert!(dir.path().join("session_file1.json").exists());
        assert_eq!(store.get::<Value>(&sid("file1")), Some(record));

        store.remove(&sid("file1")).unwrap();
        store.remove(&sid("file1")).unwrap();
        assert!(store.get::<Value>(&sid("file1")).is_none());
    }

    #[test]
    fn dir_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirStorage::new(dir.path()).unwrap();
        assert!(matches!(
            storage.set_item("../escape", "x".to_string()),
            Err(StoreError::InvalidKey(_))
        ));
        assert_eq!(storage.get_item("../escape"), None);
        assert!(storage.remove_item("../escape").is_ok());
    }

    #[test]
    fn dir_storage_treats_garbage_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("session_junk.json"), "\u{0}\u{1}garbage").unwrap();
        let store = SessionStore::new(DirStorage::new(dir.path()).unwrap());
        assert!(store.get::<Value>(&sid("junk")).is_none());
    }
}
