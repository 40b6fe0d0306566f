//! Install-then-serve cache worker.
//!
//! `AssetWorker::install` populates the bucket from the manifest and hands
//! back an [`AssetCache`] only on success, so cache-first serving is only
//! reachable from the active state. Fetching is injected as a closure, the
//! same seam the network fetcher uses, so the whole lifecycle is testable
//! offline.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};
use url::Url;

use super::manifest::{CACHE_BUCKET, MANIFEST, NOTIFY_ICON_URL};
use super::storage::{AssetStorage, CachedAsset, SqliteStorage};

/// The installing state. Consumed by `install`.
pub struct AssetWorker<S: AssetStorage> {
  storage: Arc<S>,
  bucket: String,
}

impl<S: AssetStorage> AssetWorker<S> {
  pub fn new(storage: Arc<S>, bucket: impl Into<String>) -> Self {
    Self {
      storage,
      bucket: bucket.into(),
    }
  }

  /// Populate the bucket from the manifest, all-or-nothing.
  ///
  /// A bucket that already holds every manifest entry is left untouched.
  /// Otherwise every entry is fetched; the first failure aborts the install
  /// and nothing is stored. There is no partial population and no retry.
  pub async fn install<F, Fut>(self, manifest: &[&str], fetcher: F) -> Result<AssetCache<S>>
  where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<CachedAsset>>,
  {
    let mut installed = true;
    for url in manifest {
      if !self.storage.contains(&self.bucket, url)? {
        installed = false;
        break;
      }
    }

    if installed {
      debug!("asset bucket {} already populated", self.bucket);
    } else {
      let fetches = manifest.iter().map(|url| fetcher(url.to_string()));
      let assets = futures::future::try_join_all(fetches).await?;
      self.storage.put_all(&self.bucket, &assets)?;
      info!(
        "installed {} assets into bucket {}",
        assets.len(),
        self.bucket
      );
    }

    Ok(AssetCache {
      storage: self.storage,
      bucket: self.bucket,
    })
  }
}

/// The active state: cache-first lookups over an installed bucket.
pub struct AssetCache<S: AssetStorage> {
  storage: Arc<S>,
  bucket: String,
}

impl<S: AssetStorage> AssetCache<S> {
  /// Serve `url` cache-first. A hit returns the stored bytes verbatim, with
  /// no freshness check; a miss passes through to `fetcher` and the response
  /// is NOT added to the bucket.
  pub async fn fetch<F, Fut>(&self, url: &str, fetcher: F) -> Result<CachedAsset>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<CachedAsset>>,
  {
    if let Some(hit) = self.storage.get(&self.bucket, url)? {
      debug!("asset cache hit for {}", url);
      return Ok(hit);
    }

    debug!("asset cache miss for {}, passing through", url);
    fetcher().await
  }
}

/// Fetch one asset over HTTP. Non-2xx responses count as failures.
async fn fetch_asset(client: &reqwest::Client, url: &str) -> Result<CachedAsset> {
  let parsed = Url::parse(url).map_err(|e| eyre!("Bad asset URL {}: {}", url, e))?;

  let response = client
    .get(parsed)
    .send()
    .await
    .map_err(|e| eyre!("Failed to fetch {}: {}", url, e))?
    .error_for_status()
    .map_err(|e| eyre!("Asset fetch {} returned an error status: {}", url, e))?;

  let content_type = response
    .headers()
    .get(CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .map(String::from);

  let body = response
    .bytes()
    .await
    .map_err(|e| eyre!("Failed to read body of {}: {}", url, e))?
    .to_vec();

  Ok(CachedAsset {
    url: url.to_string(),
    content_type,
    body,
  })
}

/// Run the full worker lifecycle against the real network: install the
/// manifest, then materialize the notification icon from the cache into the
/// data directory. Returns the icon path.
pub async fn install_and_materialize(data_dir: &Path) -> Result<PathBuf> {
  let storage = Arc::new(SqliteStorage::open(data_dir)?);
  let client = reqwest::Client::new();

  let worker = AssetWorker::new(storage, CACHE_BUCKET);
  let cache = worker
    .install(MANIFEST, |url| {
      let client = client.clone();
      async move { fetch_asset(&client, &url).await }
    })
    .await?;

  let icon = cache
    .fetch(NOTIFY_ICON_URL, || {
      let client = client.clone();
      async move { fetch_asset(&client, NOTIFY_ICON_URL).await }
    })
    .await?;

  let path = data_dir.join("icon-192.png");
  std::fs::write(&path, &icon.body)
    .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;

  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn asset(url: &str, body: &[u8]) -> CachedAsset {
    CachedAsset {
      url: url.to_string(),
      content_type: Some("image/png".to_string()),
      body: body.to_vec(),
    }
  }

  fn counting_fetcher(
    counter: Arc<AtomicUsize>,
    fail_on: Option<&'static str>,
  ) -> impl Fn(String) -> std::pin::Pin<Box<dyn Future<Output = Result<CachedAsset>>>> {
    move |url: String| {
      let counter = counter.clone();
      Box::pin(async move {
        counter.fetch_add(1, Ordering::SeqCst);
        if Some(url.as_str()) == fail_on {
          return Err(eyre!("fetch of {} failed", url));
        }
        Ok(asset(&url, url.as_bytes()))
      })
    }
  }

  #[tokio::test]
  async fn test_install_is_all_or_nothing() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let counter = Arc::new(AtomicUsize::new(0));

    let worker = AssetWorker::new(storage.clone(), "test-v1");
    let result = worker
      .install(&["/a", "/b"], counting_fetcher(counter, Some("/b")))
      .await;

    assert!(result.is_err());
    // /a fetched fine, but must not have been stored either
    assert!(!storage.contains("test-v1", "/a").unwrap());
    assert!(!storage.contains("test-v1", "/b").unwrap());
  }

  #[tokio::test]
  async fn test_install_populates_every_entry() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let counter = Arc::new(AtomicUsize::new(0));

    let worker = AssetWorker::new(storage.clone(), "test-v1");
    worker
      .install(&["/a", "/b"], counting_fetcher(counter, None))
      .await
      .unwrap();

    assert!(storage.contains("test-v1", "/a").unwrap());
    assert!(storage.contains("test-v1", "/b").unwrap());
  }

  #[tokio::test]
  async fn test_hit_serves_cached_bytes_without_network() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let install_counter = Arc::new(AtomicUsize::new(0));

    let worker = AssetWorker::new(storage, "test-v1");
    let cache = worker
      .install(&["/a"], counting_fetcher(install_counter, None))
      .await
      .unwrap();

    let network = Arc::new(AtomicUsize::new(0));
    let hit = cache
      .fetch("/a", || {
        let network = network.clone();
        async move {
          network.fetch_add(1, Ordering::SeqCst);
          Ok(asset("/a", b"fresh"))
        }
      })
      .await
      .unwrap();

    assert_eq!(hit.body, b"/a");
    assert_eq!(network.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_miss_passes_through_without_storing() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let counter = Arc::new(AtomicUsize::new(0));

    let worker = AssetWorker::new(storage.clone(), "test-v1");
    let cache = worker
      .install(&["/a"], counting_fetcher(counter, None))
      .await
      .unwrap();

    let network = Arc::new(AtomicUsize::new(0));
    let miss = cache
      .fetch("/other", || {
        let network = network.clone();
        async move {
          network.fetch_add(1, Ordering::SeqCst);
          Ok(asset("/other", b"passthrough"))
        }
      })
      .await
      .unwrap();

    assert_eq!(miss.body, b"passthrough");
    assert_eq!(network.load(Ordering::SeqCst), 1);
    // the bucket never grows after install
    assert!(!storage.contains("test-v1", "/other").unwrap());
  }

  #[tokio::test]
  async fn test_reinstall_skips_populated_bucket() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());

    let first = Arc::new(AtomicUsize::new(0));
    AssetWorker::new(storage.clone(), "test-v1")
      .install(&["/a", "/b"], counting_fetcher(first.clone(), None))
      .await
      .unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 2);

    let second = Arc::new(AtomicUsize::new(0));
    AssetWorker::new(storage.clone(), "test-v1")
      .install(&["/a", "/b"], counting_fetcher(second.clone(), None))
      .await
      .unwrap();
    assert_eq!(second.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_bucket_rename_triggers_fresh_install() {
    let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());

    let v1 = Arc::new(AtomicUsize::new(0));
    AssetWorker::new(storage.clone(), "test-v1")
      .install(&["/a"], counting_fetcher(v1, None))
      .await
      .unwrap();

    let v2 = Arc::new(AtomicUsize::new(0));
    AssetWorker::new(storage.clone(), "test-v2")
      .install(&["/a"], counting_fetcher(v2.clone(), None))
      .await
      .unwrap();
    assert_eq!(v2.load(Ordering::SeqCst), 1);
  }
}
