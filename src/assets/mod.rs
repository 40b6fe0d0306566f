//! Offline asset cache: install-time population, cache-first serving.
//!
//! Mirrors the behavior of a service-worker asset cache. A fixed manifest is
//! fetched into a named, version-tagged bucket when the app starts; lookups
//! are served from the bucket without revalidation, and misses pass through
//! to the network without growing the cache.

mod manifest;
mod storage;
mod worker;

pub use manifest::{CACHE_BUCKET, MANIFEST, NOTIFY_ICON_URL};
pub use storage::{AssetStorage, CachedAsset, SqliteStorage};
pub use worker::{install_and_materialize, AssetCache, AssetWorker};
