// Storage slot adapters
// String-keyed get/set/remove of serialized blobs. Callers own (de)serialization
// and fall back to defaults on bad data; adapters only move strings.

use std::collections::HashMap;
use std::path::Path;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use super::app_db;

/// Persistent key-value capability consumed by the app state.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Write several slots as one logical unit.
    /// The default writes in order; stores with transactions override it.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// SQLite-backed store over the App DB `app_settings` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the App DB at `db_path`.
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        let conn = app_db::open_app_db(db_path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = app_db::open_app_db_in_memory()?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.conn.query_row(
            "SELECT value FROM app_settings WHERE key = ?1",
            [key],
            |row| row.get(0),
        ).optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        upsert(&self.conn, key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM app_settings WHERE key = ?1", [key])?;
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            upsert(&tx, key, value)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn upsert(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO app_settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

/// Volatile store for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots<'a>(slots: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            slots: slots
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_store_get_set_remove() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(store.get("missing").unwrap(), None);

        store.set("kiddieflix.pinHash", "abc").unwrap();
        assert_eq!(store.get("kiddieflix.pinHash").unwrap().as_deref(), Some("abc"));

        store.set("kiddieflix.pinHash", "def").unwrap();
        assert_eq!(store.get("kiddieflix.pinHash").unwrap().as_deref(), Some("def"));

        store.remove("kiddieflix.pinHash").unwrap();
        assert_eq!(store.get("kiddieflix.pinHash").unwrap(), None);

        // Removing a missing key is not an error
        store.remove("kiddieflix.pinHash").unwrap();
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db");

        {
            let mut store = SqliteStore::open(&db_path).unwrap();
            store.set_many(&[
                ("kiddieflix.videos", "[]".to_string()),
                ("kiddieflix.favorites", "{}".to_string()),
            ]).unwrap();
        }

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.get("kiddieflix.videos").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("kiddieflix.favorites").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_sqlite_set_many_is_all_or_nothing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.set("a", "old").unwrap();

        // Make the second write fail inside the transaction
        store.conn.execute_batch(
            "CREATE TRIGGER block_b BEFORE INSERT ON app_settings WHEN NEW.key = 'b'
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;"
        ).unwrap();

        let result = store.set_many(&[("a", "new".to_string()), ("b", "x".to_string())]);
        assert!(result.is_err());
        assert_eq!(store.get("a").unwrap().as_deref(), Some("old"), "First write must roll back");
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::with_slots([("k", "v")]);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.set_many(&[("k", "w".to_string()), ("j", "x".to_string())]).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));
        assert_eq!(store.get("j").unwrap().as_deref(), Some("x"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
