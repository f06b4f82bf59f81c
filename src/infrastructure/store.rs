//! File-backed key-value storage: one file per key under a data directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::infrastructure::traits::{FileSystem, KeyValueStore};

/// Stores each record as `<dir>/<key>.json`.
pub struct FileKeyValueStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key: {key:?}"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key)?;
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        self.fs.read_to_string(&path).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        debug!("store set: {}", path.display());
        self.fs.ensure_parent(&path)?;
        self.fs.write(&path, value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        if self.fs.exists(&path) {
            self.fs.remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;

    #[test]
    fn given_written_key_when_reading_then_returns_value() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileKeyValueStore::new(Arc::new(RealFileSystem), temp.path().join("data"));

        store.set("theme", "\"dark\"").unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("\"dark\""));
        assert!(temp.path().join("data/theme.json").exists());
    }

    #[test]
    fn given_missing_key_when_reading_then_none() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileKeyValueStore::new(Arc::new(RealFileSystem), temp.path());
        assert_eq!(store.get("formData").unwrap(), None);
        store.remove("formData").unwrap();
    }

    #[test]
    fn given_path_like_key_when_writing_then_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileKeyValueStore::new(Arc::new(RealFileSystem), temp.path());
        let err = store.set("../escape", "x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
