use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const FAVORITES_KEY: &str = "favorites";
pub const HISTORY_KEY: &str = "listeningHistory";
pub const POSITIONS_KEY: &str = "playbackPositions";
pub const THEME_KEY: &str = "theme";

/// String key-value persistence port. Values are opaque strings, usually JSON.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read `{key}`"))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
                params![key, value, now],
            )
            .with_context(|| format!("failed to write `{key}`"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .with_context(|| format!("failed to remove `{key}`"))?;
        Ok(())
    }
}

/// Reads a JSON document, falling back to the default when the key is absent,
/// unreadable or corrupt.
pub fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::warn!(key, error = %format!("{err:#}"), "store read failed, using default");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding corrupt stored value");
            T::default()
        }
    }
}

pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).with_context(|| format!("failed to encode `{key}`"))?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn sqlite_store_set_get_remove() {
        let store = SqliteStore::open_in_memory().expect("open");
        store.migrate().expect("migrate");

        assert_eq!(store.get("theme").expect("get"), None);
        store.set("theme", "dark").expect("set");
        store.set("theme", "light").expect("overwrite");
        assert_eq!(store.get("theme").expect("get").as_deref(), Some("light"));

        store.remove("theme").expect("remove");
        assert_eq!(store.get("theme").expect("get"), None);
    }

    #[test]
    fn sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("podshelf.db");
        {
            let store = SqliteStore::open(&path).expect("open");
            store.migrate().expect("migrate");
            store.set(POSITIONS_KEY, r#"{"1:1:1":12.5}"#).expect("set");
        }

        let store = SqliteStore::open(&path).expect("reopen");
        store.migrate().expect("migrate is idempotent");
        let positions: BTreeMap<String, f64> = load_json(&store, POSITIONS_KEY);
        assert_eq!(positions.get("1:1:1"), Some(&12.5));
    }

    #[test]
    fn load_json_falls_back_to_default_on_corrupt_payload() {
        let store = SqliteStore::open_in_memory().expect("open");
        store.migrate().expect("migrate");
        store.set(FAVORITES_KEY, "{not json").expect("set");

        let favorites: Vec<String> = load_json(&store, FAVORITES_KEY);
        assert!(favorites.is_empty());
    }

    #[test]
    fn load_json_falls_back_when_table_is_missing() {
        let store = SqliteStore::open_in_memory().expect("open");

        let positions: BTreeMap<String, f64> = load_json(&store, POSITIONS_KEY);
        assert!(positions.is_empty());
    }

    #[test]
    fn save_json_writes_full_document() {
        let store = SqliteStore::open_in_memory().expect("open");
        store.migrate().expect("migrate");

        save_json(&store, HISTORY_KEY, &vec!["a", "b"]).expect("save");
        assert_eq!(
            store.get(HISTORY_KEY).expect("get").as_deref(),
            Some(r#"["a","b"]"#)
        );
    }
}
