//! Persistent key-value store backing the task list and UI settings.
//!
//! The whole task list is stored as one JSON document under a single key,
//! written wholesale after every mutation. A second key holds the theme name.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Key holding the JSON-serialized task array.
pub const TASKS_KEY: &str = "tasks";

/// Key holding the current theme name ("light" / "dark").
pub const THEME_KEY: &str = "theme";

/// Schema for the key-value table.
const KV_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Handle to the key-value store. Cheap to clone; all clones share one
/// connection.
#[derive(Clone)]
pub struct KvStore {
  conn: Arc<Mutex<Connection>>,
}

impl KvStore {
  /// Open or create the store at `<data_dir>/jotter.db`.
  pub fn open(data_dir: &Path) -> Result<Self> {
    std::fs::create_dir_all(data_dir)
      .map_err(|e| eyre!("Failed to create data directory {}: {}", data_dir.display(), e))?;

    let path = data_dir.join("jotter.db");
    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Open an in-memory store. Used by tests.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory db: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(KV_SCHEMA)
      .map_err(|e| eyre!("Failed to run kv migrations: {}", e))?;

    Ok(Self {
      conn: Arc::new(Mutex::new(conn)),
    })
  }

  /// Read the value stored under `key`, if any.
  pub fn get(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
        row.get(0)
      })
      .optional()
      .map_err(|e| eyre!("Failed to read key {}: {}", key, e))
  }

  /// Overwrite the value under `key` in a single statement.
  pub fn set(&self, key: &str, value: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write key {}: {}", key, e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_key_is_none() {
    let kv = KvStore::open_in_memory().unwrap();
    assert_eq!(kv.get("nope").unwrap(), None);
  }

  #[test]
  fn test_set_then_get() {
    let kv = KvStore::open_in_memory().unwrap();
    kv.set("theme", "dark").unwrap();
    assert_eq!(kv.get("theme").unwrap().as_deref(), Some("dark"));
  }

  #[test]
  fn test_set_overwrites() {
    let kv = KvStore::open_in_memory().unwrap();
    kv.set("tasks", "[]").unwrap();
    kv.set("tasks", "[1]").unwrap();
    assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[1]"));
  }

  #[test]
  fn test_clones_share_data() {
    let kv = KvStore::open_in_memory().unwrap();
    let other = kv.clone();
    kv.set("theme", "light").unwrap();
    assert_eq!(other.get("theme").unwrap().as_deref(), Some("light"));
  }

  #[test]
  fn test_open_creates_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("deep").join("data");
    let kv = KvStore::open(&nested).unwrap();
    kv.set("theme", "dark").unwrap();
    assert!(nested.join("jotter.db").exists());
  }
}
