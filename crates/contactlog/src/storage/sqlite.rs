//! `SQLite` slot backend.
//!
//! Slots are rows in a single table. Each `set` is one upsert statement, so
//! the previous value stays in place until the new one is committed.
//! `rusqlite` is blocking, so every statement runs on tokio's blocking pool
//! while holding the connection mutex.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::schema::{SELECT_SLOT, UPSERT_SLOT};
use super::{migrations, KeyValueStore};
use crate::error::{Error, Result};

/// Slots stored in a `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection, shared with blocking tasks.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a slot database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, key: &str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let owned_key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::storage(&owned_key, "database connection lock poisoned"))?;
            op(&guard, &owned_key).map_err(|e| Error::storage(&owned_key, e))
        })
        .await
        .map_err(|e| Error::storage(key, format!("database task failed: {e}")))?
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(key, |conn, key| {
            conn.query_row(SELECT_SLOT, [key], |row| row.get(0))
                .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let value = value.to_string();
        let len = value.len();
        self.with_conn(key, move |conn, key| {
            conn.execute(UPSERT_SLOT, params![key, value]).map(|_| ())
        })
        .await?;
        debug!("Wrote {} bytes to slot {}", len, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = create_test_store();
        assert!(store.get("contacts").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = create_test_store();
        store.set("contacts", "[1]").await.unwrap();
        store.set("contacts", "[1,2]").await.unwrap();

        assert_eq!(
            store.get("contacts").await.unwrap().as_deref(),
            Some("[1,2]")
        );
    }

    #[tokio::test]
    async fn test_one_row_per_slot() {
        let store = create_test_store();
        store.set("contacts", "a").await.unwrap();
        store.set("contacts", "b").await.unwrap();
        store.set("other", "c").await.unwrap();

        let count: i64 = store
            .conn
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_unicode_value() {
        let store = create_test_store();
        let value = r#"[{"name":"Zoë","location":"Tōkyō"}]"#;
        store.set("contacts", value).await.unwrap();

        assert_eq!(store.get("contacts").await.unwrap().as_deref(), Some(value));
    }

    #[tokio::test]
    async fn test_concurrent_writers_each_land() {
        let store = Arc::new(create_test_store());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.set(&format!("slot{i}"), &format!("[{i}]")).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for i in 0..8 {
            assert_eq!(
                store.get(&format!("slot{i}")).await.unwrap(),
                Some(format!("[{i}]"))
            );
        }
    }

    #[test]
    fn test_path_in_memory() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[tokio::test]
    async fn test_open_file_based_persists() {
        let db_path =
            std::env::temp_dir().join(format!("contactlog_sqlite_test_{}.db", std::process::id()));

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.set("contacts", "[]").await.unwrap();
            assert_eq!(store.path(), db_path);
        }

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(reopened.get("contacts").await.unwrap().as_deref(), Some("[]"));

        drop(reopened);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let nested_path = std::env::temp_dir().join(format!(
            "contactlog_sqlite_{}/nested/contacts.db",
            std::process::id()
        ));

        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent.parent().unwrap());
        }
    }
}
