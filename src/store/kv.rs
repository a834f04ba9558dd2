//! Durable key-value storage for JSON blobs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage keys for every persisted collection.
pub mod keys {
    pub const FAVORITES: &str = "chefgenius_favorites";
    pub const FRIDGE: &str = "chefgenius_fridge";
    pub const COOKED_LOG: &str = "chefgenius_cooked_log";
    pub const HISTORY: &str = "chefgenius_history_v2";
    pub const RECIPE_CACHE: &str = "chefgenius_recipe_cache";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("Serialization error on key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key: key.to_string(), source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io { key: key.to_string(), source };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        // readers only ever see a complete blob
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        debug!(key, bytes = value.len(), "Persisted value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { key: key.to_string(), source }),
        }
    }
}

/// In-process store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Reads and decodes `key`. Missing, unreadable and corrupt values all come
/// back as `None`; the latter two are logged.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored value, using default");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Stored value is not valid JSON, using default");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip_and_remove() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = JsonFileStore::new(dir.path().join("nested"));
        assert_eq!(store.get(keys::FRIDGE)?, None);

        store.set(keys::FRIDGE, r#"[{"name":"鸡蛋","amount":"6个"}]"#)?;
        assert!(dir.path().join("nested").join("chefgenius_fridge.json").exists());
        assert_eq!(
            store.get(keys::FRIDGE)?.as_deref(),
            Some(r#"[{"name":"鸡蛋","amount":"6个"}]"#)
        );

        store.remove(keys::FRIDGE)?;
        assert_eq!(store.get(keys::FRIDGE)?, None);
        store.remove(keys::FRIDGE)?;
        Ok(())
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let store = JsonFileStore::new("unused");
        assert!(matches!(store.get("../etc/passwd"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.set("", "x"), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_load_json_ignores_corrupt_values() {
        let store = MemoryStore::new();
        store.set(keys::HISTORY, "{not json").unwrap();
        let loaded: Option<Vec<String>> = load_json(&store, keys::HISTORY);
        assert!(loaded.is_none());

        save_json(&store, keys::HISTORY, &vec!["a".to_string()]).unwrap();
        let loaded: Option<Vec<String>> = load_json(&store, keys::HISTORY);
        assert_eq!(loaded, Some(vec!["a".to_string()]));
    }
}
