//! Key-value persistence backends for the conversation store

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tempfile::NamedTempFile;
use tracing::debug;

use super::errors::{StoreError, StoreResult};

/// Whole-value string storage keyed by a namespace key
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing was ever written
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StoreError::PersistenceRead(format!("{}: {}", path.display(), e)))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        let write_err = |e: std::io::Error| StoreError::PersistenceWrite(format!("{}: {}", path.display(), e));

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        // Write next to the target and rename so readers never see half a file
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(value.as_bytes()).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!("Persisted {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, e.g. to simulate data left by a previous run
    #[cfg(test)]
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::PersistenceRead(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::PersistenceWrite(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.get("nothing").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_overwrites_whole_value() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();

        assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
        assert!(storage.path_for("k").ends_with("k.json"));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new().with_entry("k", "seeded");
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("seeded"));

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }
}
