/// Durable settings storage
///
/// One SQLite table of JSON-encoded values under fixed string keys.
/// Everything the app persists across sessions (the like mapping, the
/// dark-mode flag) goes through here, behind a small persistence trait
/// so tests can swap in an in-memory backend.

use std::path::PathBuf;

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Settings key holding the JSON-encoded like mapping.
pub const LIKES_KEY: &str = "likes";
/// Settings key holding the JSON-encoded dark-mode flag.
pub const DARK_MODE_KEY: &str = "dark";

/// Errors raised by the settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("corrupt settings value: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Key-value persistence seam for everything the app stores durably.
pub trait Persist {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// The SettingsStore manages the SQLite settings database.
///
/// The database file is created in the user's data directory:
/// - Linux: ~/.local/share/stargram/stargram.db
/// - macOS: ~/Library/Application Support/stargram/stargram.db
/// - Windows: %APPDATA%\stargram\stargram.db
pub struct SettingsStore {
    conn: Connection,
    db_path: PathBuf,
}

impl SettingsStore {
    /// Open the settings database at its default location.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_db_path())
    }

    /// Open (or create) the settings database at `db_path`.
    pub fn open(db_path: PathBuf) -> Result<Self, StoreError> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        let conn = Connection::open(&db_path)?;

        println!("📁 Settings database at: {}", db_path.display());

        let store = SettingsStore { conn, db_path };
        store.init_schema()?;

        Ok(store)
    }

    /// Get the path where the database should be stored
    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(|| dirs::home_dir())
            .expect("Could not determine user data directory");

        path.push("stargram");
        path.push("stargram.db");
        path
    }

    /// Create the settings table if it doesn't exist.
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

impl Persist for SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Read a JSON-encoded value under `key`; `None` when unset.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn Persist,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Write a value JSON-encoded under `key`.
pub fn set_json<T: Serialize>(store: &dyn Persist, key: &str, value: &T) -> Result<(), StoreError> {
    store.set(key, &serde_json::to_string(value)?)
}

/// In-memory stand-in for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore(std::cell::RefCell<std::collections::HashMap<String, String>>);

#[cfg(test)]
impl Persist for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.0.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_settings_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("settings.db");

        {
            let store = SettingsStore::open(db_path.clone()).unwrap();
            store.set("dark", "true").unwrap();
        }

        let store = SettingsStore::open(db_path).unwrap();
        assert_eq!(store.get("dark").unwrap().as_deref(), Some("true"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.db")).unwrap();

        store.set("dark", "false").unwrap();
        store.set("dark", "true").unwrap();

        assert_eq!(store.get("dark").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_json_round_trip() {
        let backend = MemoryStore::default();

        let mut likes = BTreeMap::new();
        likes.insert(String::from("2024-03-02"), true);
        set_json(&backend, LIKES_KEY, &likes).unwrap();

        let restored: BTreeMap<String, bool> = get_json(&backend, LIKES_KEY).unwrap().unwrap();
        assert_eq!(restored, likes);

        let missing: Option<bool> = get_json(&backend, DARK_MODE_KEY).unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_corrupt_json_is_an_error_not_a_panic() {
        let backend = MemoryStore::default();
        backend.set(LIKES_KEY, "{not json").unwrap();

        let result: Result<Option<bool>, StoreError> = get_json(&backend, LIKES_KEY);
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
