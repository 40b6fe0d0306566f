//! Asset cache storage trait and SQLite implementation.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// A fetched asset body plus the response metadata worth keeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsset {
  pub url: String,
  pub content_type: Option<String>,
  pub body: Vec<u8>,
}

/// Trait for asset cache storage backends.
pub trait AssetStorage: Send + Sync {
  /// Store a full set of assets into a bucket in one transaction. Either all
  /// rows land or none do.
  fn put_all(&self, bucket: &str, assets: &[CachedAsset]) -> Result<()>;

  /// Look up a single asset by URL.
  fn get(&self, bucket: &str, url: &str) -> Result<Option<CachedAsset>>;

  /// Whether the bucket holds an entry for the URL.
  fn contains(&self, bucket: &str, url: &str) -> Result<bool>;
}

/// Schema for the asset cache table.
const ASSET_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS asset_cache (
    bucket TEXT NOT NULL,
    url TEXT NOT NULL,
    content_type TEXT,
    body BLOB NOT NULL,
    fetched_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (bucket, url)
);
"#;

/// SQLite-backed asset storage. Shares the database file with the key-value
/// store but owns its own connection.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open or create the asset tables in `<data_dir>/jotter.db`.
  pub fn open(data_dir: &Path) -> Result<Self> {
    std::fs::create_dir_all(data_dir)
      .map_err(|e| eyre!("Failed to create data directory {}: {}", data_dir.display(), e))?;

    let path = data_dir.join("jotter.db");
    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open asset cache at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// In-memory storage for tests.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory db: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(ASSET_SCHEMA)
      .map_err(|e| eyre!("Failed to run asset cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }
}

impl AssetStorage for SqliteStorage {
  fn put_all(&self, bucket: &str, assets: &[CachedAsset]) -> Result<()> {
    let mut conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    for asset in assets {
      tx.execute(
        "INSERT OR REPLACE INTO asset_cache (bucket, url, content_type, body, fetched_at)
         VALUES (?, ?, ?, ?, datetime('now'))",
        params![bucket, asset.url, asset.content_type, asset.body],
      )
      .map_err(|e| eyre!("Failed to store asset {}: {}", asset.url, e))?;
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit asset cache: {}", e))?;

    Ok(())
  }

  fn get(&self, bucket: &str, url: &str) -> Result<Option<CachedAsset>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Option<String>, Vec<u8>)> = conn
      .query_row(
        "SELECT content_type, body FROM asset_cache WHERE bucket = ? AND url = ?",
        params![bucket, url],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read asset {}: {}", url, e))?;

    Ok(row.map(|(content_type, body)| CachedAsset {
      url: url.to_string(),
      content_type,
      body,
    }))
  }

  fn contains(&self, bucket: &str, url: &str) -> Result<bool> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let found: Option<i64> = conn
      .query_row(
        "SELECT 1 FROM asset_cache WHERE bucket = ? AND url = ?",
        params![bucket, url],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to probe asset {}: {}", url, e))?;

    Ok(found.is_some())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn asset(url: &str, body: &[u8]) -> CachedAsset {
    CachedAsset {
      url: url.to_string(),
      content_type: Some("image/png".to_string()),
      body: body.to_vec(),
    }
  }

  #[test]
  fn test_put_all_then_get() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage
      .put_all("v1", &[asset("/a", b"aaa"), asset("/b", b"bbb")])
      .unwrap();

    let hit = storage.get("v1", "/a").unwrap().unwrap();
    assert_eq!(hit.body, b"aaa");
    assert_eq!(hit.content_type.as_deref(), Some("image/png"));
  }

  #[test]
  fn test_get_misses_other_bucket() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put_all("v1", &[asset("/a", b"aaa")]).unwrap();

    assert!(storage.get("v2", "/a").unwrap().is_none());
    assert!(!storage.contains("v2", "/a").unwrap());
    assert!(storage.contains("v1", "/a").unwrap());
  }

  #[test]
  fn test_put_all_replaces_existing_rows() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put_all("v1", &[asset("/a", b"old")]).unwrap();
    storage.put_all("v1", &[asset("/a", b"new")]).unwrap();

    assert_eq!(storage.get("v1", "/a").unwrap().unwrap().body, b"new");
  }
}
