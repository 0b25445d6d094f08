// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Key-value backends for the persisted collection

use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::{GalleryError, Result};

/// String-keyed blob storage
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value under `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite-backed key-value store (thread-safe wrapper)
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize()?;
        Ok(store)
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| GalleryError::Lock)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#)?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock_conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"INSERT OR REPLACE INTO kv (key, value, updated_at)
               VALUES (?1, ?2, datetime('now'))"#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Process-local store, nothing survives the session
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| GalleryError::Lock)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| GalleryError::Lock)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| GalleryError::Lock)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("imageData").unwrap(), None);

        store.set("imageData", "[]").unwrap();
        assert_eq!(store.get("imageData").unwrap().as_deref(), Some("[]"));

        store.set("imageData", r#"[{"id":"a"}]"#).unwrap();
        assert_eq!(store.get("imageData").unwrap().as_deref(), Some(r#"[{"id":"a"}]"#));

        store.remove("imageData").unwrap();
        assert_eq!(store.get("imageData").unwrap(), None);

        // removing twice is fine
        store.remove("imageData").unwrap();
    }

    #[test]
    fn test_sqlite_in_memory() {
        exercise(&SqliteStore::in_memory().unwrap());
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_sqlite_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("gallery.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("imageData", "[1]").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("imageData").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_keys_are_independent() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }
}
