//! The fixed asset manifest pinned at install time.

/// Version-tagged cache bucket. Bump the tag to invalidate old entries; stale
/// buckets are left in place rather than evicted.
pub const CACHE_BUCKET: &str = "jotter-v3";

/// Assets fetched at install. Either every entry lands in the bucket or none
/// does.
pub const MANIFEST: &[&str] = &[
  "https://dummyimage.com/192x192/ffffff/000000.png&text=JT",
  "https://dummyimage.com/300x300/ffffff/000000.png&text=Jotter",
];

/// Icon attached to desktop notifications (the 192px manifest entry).
pub const NOTIFY_ICON_URL: &str = "https://dummyimage.com/192x192/ffffff/000000.png&text=JT";
