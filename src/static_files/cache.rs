//! In-memory cache for the hottest static files.
//!
//! Populated once before the listener starts and never mutated again,
//! so it is shared across request tasks behind an `Arc` with no
//! locking. There is no invalidation or refresh path; a changed file on
//! disk is only picked up by a process restart.

use std::path::Path;

use bytes::Bytes;

/// Logical filename of the index resource.
pub const INDEX_FILE: &str = "index.html";
/// Logical filename of the friendly 404 page.
pub const NOT_FOUND_FILE: &str = "404.html";

/// Byte content for the closed set of logical cache keys.
///
/// A `None` slot means the file was absent (or unreadable) at startup,
/// or that caching is disabled; consumers fall back to disk.
#[derive(Debug, Default)]
pub struct StaticCache {
    index: Option<Bytes>,
    not_found: Option<Bytes>,
}

impl StaticCache {
    /// Build the cache by reading the well-known files from the public
    /// directory. A missing file leaves its slot empty rather than
    /// failing startup.
    pub async fn build(public_dir: &Path) -> Self {
        let index = read_optional(&public_dir.join(INDEX_FILE)).await;
        let not_found = read_optional(&public_dir.join(NOT_FOUND_FILE)).await;

        tracing::info!(
            public_dir = %public_dir.display(),
            index_cached = index.is_some(),
            not_found_cached = not_found.is_some(),
            "Static cache populated"
        );

        Self { index, not_found }
    }

    /// An empty cache for when caching is disabled. Lookups always miss.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construct a cache from raw entries.
    pub fn from_parts(index: Option<Vec<u8>>, not_found: Option<Vec<u8>>) -> Self {
        Self {
            index: index.map(Bytes::from),
            not_found: not_found.map(Bytes::from),
        }
    }

    /// Cached bytes of the index page, if present.
    pub fn index(&self) -> Option<Bytes> {
        self.index.clone()
    }

    /// Cached bytes of the friendly 404 page, if present.
    pub fn not_found(&self) -> Option<Bytes> {
        self.not_found.clone()
    }
}

async fn read_optional(path: &Path) -> Option<Bytes> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "File not cached");
            None
        }
    }
}
