//! Key-value persistence for the career record.

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::state::{Persistence, PersistencePatch};

/// Storage key the career record lives under.
pub const PERSISTENCE_KEY: &str = "liberation_trail_save_v1";

/// Abstract flat key-value store.
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize save data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("key {0:?} is not a valid file name")]
    InvalidKey(String),
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    type Error = StorageError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let path = self.path_for(key)?;
        fs::write(&path, value).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => {
                Err(StorageError::Io { path, source: err })
            }
            _ => Ok(()),
        }
    }
}

/// Load the career record. Missing or unreadable data yields defaults; a
/// field that fails to decode falls back to its default while the rest of the
/// record is kept.
pub fn load_persistence<S: KeyValueStore>(store: &S) -> Persistence {
    let raw = match store.get(PERSISTENCE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Persistence::default(),
        Err(err) => {
            log::warn!("could not read save data, starting fresh: {err}");
            return Persistence::default();
        }
    };
    let mut persistence = Persistence::default();
    salvage_patch(&raw).merge_into(&mut persistence);
    persistence
}

/// Decode each known field on its own so one bad value cannot cost the rest.
fn salvage_patch(raw: &str) -> PersistencePatch {
    let fields = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(fields)) => fields,
        Ok(other) => {
            log::warn!("discarding save data that is not an object: {other}");
            return PersistencePatch::default();
        }
        Err(err) => {
            log::warn!("discarding corrupt save data: {err}");
            return PersistencePatch::default();
        }
    };
    PersistencePatch {
        cholera_deaths: salvage_field(&fields, "choleraDeaths"),
        total_oil_secured: salvage_field(&fields, "totalOilSecured"),
        unlocked_roles: salvage_field(&fields, "unlockedRoles"),
        high_score: salvage_field(&fields, "highScore"),
    }
}

fn salvage_field<T: serde::de::DeserializeOwned>(
    fields: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<T> {
    let value = fields.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::warn!("resetting save field {key}: {err}");
            None
        }
    }
}

/// Write the career record as camelCase JSON.
///
/// # Errors
///
/// Returns [`StorageError`] if serialization or the store write fails.
pub fn save_persistence<S>(store: &S, persistence: &Persistence) -> Result<(), StorageError>
where
    S: KeyValueStore,
    StorageError: From<S::Error>,
{
    let raw = serde_json::to_string(persistence)?;
    store.set(PERSISTENCE_KEY, &raw)?;
    log::info!(
        "saved career record: {} deaths, {} oil secured",
        persistence.cholera_deaths,
        persistence.total_oil_secured
    );
    Ok(())
}

impl From<Infallible> for StorageError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("liberation-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let alias = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(alias.get("k").unwrap().as_deref(), Some("v"));
        alias.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn missing_or_corrupt_blob_falls_back_to_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_persistence(&store), Persistence::default());
        store.set(PERSISTENCE_KEY, "{not json").unwrap();
        assert_eq!(load_persistence(&store), Persistence::default());
        store.set(PERSISTENCE_KEY, r#"{"choleraDeaths": "many"}"#).unwrap();
        assert_eq!(load_persistence(&store), Persistence::default());
        store.set(PERSISTENCE_KEY, "[1, 2, 3]").unwrap();
        assert_eq!(load_persistence(&store), Persistence::default());
    }

    #[test]
    fn one_bad_field_keeps_the_rest_of_the_career() {
        let store = MemoryStore::new();
        store
            .set(
                PERSISTENCE_KEY,
                r#"{"choleraDeaths":"many","highScore":42,"totalOilSecured":310,"unlockedRoles":7}"#,
            )
            .unwrap();
        let loaded = load_persistence(&store);
        let defaults = Persistence::default();
        assert_eq!(loaded.high_score, 42);
        assert_eq!(loaded.total_oil_secured, 310);
        assert_eq!(loaded.cholera_deaths, defaults.cholera_deaths);
        assert_eq!(loaded.unlocked_roles, defaults.unlocked_roles);
    }

    #[test]
    fn save_writes_only_persistence_fields() {
        let store = MemoryStore::new();
        let persistence = Persistence {
            cholera_deaths: 3,
            high_score: 88,
            ..Persistence::default()
        };
        save_persistence(&store, &persistence).unwrap();
        let raw = store.get(PERSISTENCE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["choleraDeaths"], 3);
        assert_eq!(value.as_object().map(serde_json::Map::len), Some(4));
        assert_eq!(load_persistence(&store), persistence);
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = temp_dir("file-store");
        let store = FileStore::open(&dir).unwrap();
        assert_eq!(store.get(PERSISTENCE_KEY).unwrap(), None);
        save_persistence(&store, &Persistence::default()).unwrap();
        assert!(dir.join(format!("{PERSISTENCE_KEY}.json")).exists());
        assert_eq!(load_persistence(&store), Persistence::default());
        store.remove(PERSISTENCE_KEY).unwrap();
        store.remove(PERSISTENCE_KEY).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        let _ = fs::remove_dir_all(dir);
    }
}
