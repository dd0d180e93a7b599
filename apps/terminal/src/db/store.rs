//! SQLite-backed key-value store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use drill_core::{KeyValueStore, StoreError};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::error::DbError;
use crate::db::schema;

type Result<T> = std::result::Result<T, DbError>;

/// Persisted state in a single `kv` table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(schema::SCHEMA)?;
        conn.execute_batch(schema::INIT_SCHEMA_VERSION)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.conn()?;
        let version = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })?;
        Ok(version.unwrap_or(0))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove_value(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key")?;
        let keys = stmt
            .query_map(params![prefix], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        Ok(self.get_value(key)?)
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        Ok(self.set_value(key, value)?)
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        Ok(self.remove_value(key)?)
    }

    fn keys_with_prefix(&self, prefix: &str) -> std::result::Result<Vec<String>, StoreError> {
        Ok(self.keys(prefix)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::Storage;
    use std::sync::Arc;

    #[test]
    fn set_get_overwrite() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("2".to_string()));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn prefix_listing_is_literal() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("krEnQuiz:v1:xp", "10").unwrap();
        store.set("krEnQuiz:v1:state", "{}").unwrap();
        store.set("krEnQuiz_v1:xp", "99").unwrap();
        store.set("other", "x").unwrap();
        assert_eq!(
            store.keys_with_prefix("krEnQuiz:v1:").unwrap(),
            vec!["krEnQuiz:v1:state".to_string(), "krEnQuiz:v1:xp".to_string()]
        );
    }

    #[test]
    fn schema_version_recorded() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn storage_clear_through_sqlite() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.set("unrelated", "keep").unwrap();
        let storage = Storage::with_default_prefix(store.clone());
        storage.write_u32("hearts", 3);
        storage.write("state", "{}");
        storage.clear();
        assert_eq!(store.keys_with_prefix("").unwrap(), vec!["unrelated".to_string()]);
    }

    #[test]
    fn reopen_file_keeps_values() {
        let dir = std::env::temp_dir().join(format!("kr-en-drill-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("drill.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("krEnQuiz:v1:xp", "40").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("krEnQuiz:v1:xp").unwrap(), Some("40".to_string()));
        drop(store);
        std::fs::remove_dir_all(dir).ok();
    }
}
