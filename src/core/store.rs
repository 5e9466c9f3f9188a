//! Key-value persistence for generated records, usage counters and access codes.
//!
//! Callers receive a `&dyn KeyValueStore` so the pipelines never touch the
//! filesystem themselves. [`FileStore`] keeps one JSON file per key in the data
//! directory; `MemoryStore` backs the unit tests.

#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::paths;

/// Fixed keys, one per stored feature.
pub mod keys {
    pub const QUESTIONS: &str = "questions";
    pub const NOTES: &str = "notes";
    pub const USAGE_STATS: &str = "usage_stats";
    pub const SUBSCRIPTION: &str = "subscription";
    pub const ACCESS_CODES: &str = "access_codes";
}

/// Errors from a key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid store key '{0}': use letters, numbers, '-' and '_'")]
    InvalidKey(String),
    #[error("No data directory available")]
    NoDataDir,
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Stored value for '{key}' is not valid: {source}")]
    Json {
        key: String,
        source: serde_json::Error,
    },
}

/// Get / set / delete JSON values by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Read `key` and decode it as `T`. Absent keys return `None`.
pub fn get_as<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode `value` and store it under `key`.
pub fn set_as<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(value).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &value)
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// One pretty-printed JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the application data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        paths::data_dir().map(Self::new).ok_or(StoreError::NoDataDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let data = match fs::read_to_string(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            })
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        validate_key(key)?;
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_store_roundtrip() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let store = FileStore::new(tmp.path().join("data"));

        assert_eq!(store.get(keys::NOTES).unwrap(), None);

        let notes = json!([{"topic": "Heat", "content": "Q = mcΔT"}]);
        store.set(keys::NOTES, &notes).unwrap();
        assert_eq!(store.get(keys::NOTES).unwrap(), Some(notes));
        assert!(tmp.path().join("data").join("notes.json").exists());

        store.delete(keys::NOTES).unwrap();
        assert_eq!(store.get(keys::NOTES).unwrap(), None);
        store.delete(keys::NOTES).unwrap();
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let store = FileStore::new(tmp.path());
        let err = store.set("../escape", &json!(1)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn file_store_corrupt_value_is_error() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(tmp.path().join("usage_stats.json"), "{ not json").unwrap();
        let store = FileStore::new(tmp.path());
        let err = store.get(keys::USAGE_STATS).unwrap_err();
        assert!(err.to_string().contains("usage_stats"));
    }

    #[test]
    fn typed_helpers() {
        let store = MemoryStore::new();
        set_as(&store, keys::QUESTIONS, &vec!["a", "b"]).unwrap();
        let back: Option<Vec<String>> = get_as(&store, keys::QUESTIONS).unwrap();
        assert_eq!(back, Some(vec!["a".to_string(), "b".to_string()]));

        let wrong: Result<Option<u32>, _> = get_as(&store, keys::QUESTIONS);
        assert!(matches!(wrong, Err(StoreError::Json { .. })));
    }
}
