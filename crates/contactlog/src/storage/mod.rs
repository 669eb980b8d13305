//! Slot storage for contactlog.
//!
//! A slot is a named string value. The contact store keeps its whole
//! collection in one slot and talks to the backend only through
//! [`KeyValueStore`], so tests can use [`MemoryStore`] and deployments can
//! pick [`FileStore`] or [`SqliteStore`] from configuration.

pub mod file;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{BackendKind, Config};
use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Asynchronous key-value access to named slots.
///
/// A `set` either replaces the whole value or fails; readers never observe
/// a partially written value.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Short backend name for logs and status output.
    fn name(&self) -> &'static str;

    /// Read a slot, `None` if it has never been written.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slot's value.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }
}

/// Open the backend selected by the configuration.
///
/// # Errors
///
/// Returns an error if the backend's directory or database cannot be
/// created or opened.
pub fn open_backend(config: &Config) -> Result<Box<dyn KeyValueStore>> {
    let path = config.storage_path();
    debug!(
        "Opening {} backend at {}",
        config.storage.backend,
        path.display()
    );

    let backend: Box<dyn KeyValueStore> = match config.storage.backend {
        BackendKind::File => Box::new(FileStore::open(path)?),
        BackendKind::Sqlite => Box::new(SqliteStore::open(path)?),
        BackendKind::Memory => Box::new(MemoryStore::new()),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_backend() {
        let mut config = Config::default();
        config.storage.backend = BackendKind::Memory;

        let backend = open_backend(&config).unwrap();
        assert_eq!(backend.name(), "memory");
        assert!(backend.get("contacts").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_file_backend() {
        let dir = std::env::temp_dir().join(format!("contactlog_backend_file_{}", std::process::id()));
        let mut config = Config::default();
        config.storage.path = Some(dir.clone());

        let backend = open_backend(&config).unwrap();
        assert_eq!(backend.name(), "file");
        backend.set("contacts", "[]").await.unwrap();
        assert_eq!(backend.get("contacts").await.unwrap().as_deref(), Some("[]"));

        drop(backend);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_open_sqlite_backend() {
        let db_path =
            std::env::temp_dir().join(format!("contactlog_backend_{}.db", std::process::id()));
        let mut config = Config::default();
        config.storage.backend = BackendKind::Sqlite;
        config.storage.path = Some(db_path.clone());

        let backend = open_backend(&config).unwrap();
        assert_eq!(backend.name(), "sqlite");
        backend.set("contacts", "[]").await.unwrap();
        assert_eq!(backend.get("contacts").await.unwrap().as_deref(), Some("[]"));

        drop(backend);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }
}
