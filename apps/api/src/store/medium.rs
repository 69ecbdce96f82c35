//! Durable key/value medium behind the document store and chat log.
//!
//! One JSON document per key. `FileMedium` keeps each key in
//! `<data_dir>/<key>.json` and replaces files atomically, so a crash mid-write
//! leaves the previous value intact.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait StorageMedium: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    /// Opens (creating if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageMedium for FileMedium {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key);
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key);
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(value.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// Process-local medium for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryMedium {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryMedium {
    fn entries(&self) -> std::sync::MutexGuard<'_, std::collections::HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
impl StorageMedium for MemoryMedium {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_medium_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::open(dir.path()).unwrap();
        assert_eq!(medium.read("nothing").unwrap(), None);
        medium.remove("nothing").unwrap();
    }

    #[test]
    fn test_file_medium_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::open(dir.path().join("nested")).unwrap();
        medium.write("k", "{\"a\":1}").unwrap();
        medium.write("k", "{\"a\":2}").unwrap();
        assert_eq!(medium.read("k").unwrap().as_deref(), Some("{\"a\":2}"));
        assert!(medium.dir().join("k.json").exists());
        medium.remove("k").unwrap();
        assert_eq!(medium.read("k").unwrap(), None);
    }

    #[test]
    fn test_memory_medium() {
        let medium = MemoryMedium::default();
        medium.write("k", "v").unwrap();
        assert_eq!(medium.read("k").unwrap().as_deref(), Some("v"));
        medium.remove("k").unwrap();
        assert_eq!(medium.read("k").unwrap(), None);
    }
}
