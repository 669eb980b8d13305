//! File-per-slot backend.
//!
//! Each slot lives in `<dir>/<key>.json`. Writes go to a sibling temporary
//! file which is then renamed over the slot file, so a crash mid-write leaves
//! the previous value intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::KeyValueStore;
use crate::error::{Error, Result};

/// Slots stored as individual files in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a file store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
            info!("Created data directory {}", dir.display());
        }

        Ok(Self { dir })
    }

    /// Get the directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the file path for a slot.
    #[must_use]
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(
                key,
                format!("reading {}: {e}", path.display()),
            )),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key);
        let temp = self.temp_path(key);

        tokio::fs::write(&temp, value).await.map_err(|e| {
            Error::storage(key, format!("writing {}: {e}", temp.display()))
        })?;

        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Error::storage(
                key,
                format!("replacing {}: {e}", path.display()),
            ));
        }

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("contactlog_{name}_{}", std::process::id()))
    }

    #[tokio::test]
    async fn test_open_creates_dir() {
        let dir = test_dir("file_open").join("nested");
        let _ = std::fs::remove_dir_all(&dir);

        let store = FileStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir);

        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_slot() {
        let dir = test_dir("file_missing");
        let store = FileStore::open(&dir).unwrap();

        assert!(store.get("contacts").await.unwrap().is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = test_dir("file_roundtrip");
        let store = FileStore::open(&dir).unwrap();

        store.set("contacts", r#"[{"a":1}]"#).await.unwrap();
        store.set("contacts", "[]").await.unwrap();

        assert_eq!(store.get("contacts").await.unwrap().as_deref(), Some("[]"));
        assert!(store.slot_path("contacts").exists());
        assert!(!store.temp_path("contacts").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_set_into_missing_dir_is_storage_fault() {
        let dir = test_dir("file_vanished");
        let store = FileStore::open(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let err = store.set("contacts", "[]").await.unwrap_err();
        assert!(err.is_storage_fault());
        assert!(err.to_string().contains("contacts"));
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let dir = test_dir("file_slots");
        let store = FileStore::open(&dir).unwrap();

        store.set("contacts", "[1]").await.unwrap();
        store.set("archive", "[2]").await.unwrap();

        assert_eq!(store.get("contacts").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("archive").await.unwrap().as_deref(), Some("[2]"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
