//! Thumbnail metadata backends.
//!
//! A metadata backend persists the `(source name, size name) → thumbnail file`
//! mapping. Implementations are picked from configuration at startup and
//! injected into the [`ThumbnailService`](crate::thumbnails::ThumbnailService).
//!
//! Backends that can answer many sources in one round-trip also implement
//! [`BatchMetadataBackend`] and expose it through
//! [`MetadataBackend::as_batch`]; [`fetch`](crate::thumbnails::fetch) refuses
//! to run against the others.

mod memory;
mod redis;
mod sqlite;

pub use self::memory::MemoryBackend;
pub use self::redis::{thumbnail_key, RedisBackend, DEFAULT_KEY_PREFIX};
pub use self::sqlite::SqliteBackend;

use thumbforge_common::{Result, ThumbnailMeta};

/// Per-source result of a batched lookup: `(size name, record)` pairs.
///
/// For a lookup of explicit sizes there is one pair per requested size, in
/// request order, with `None` where nothing is recorded. For a lookup of all
/// sizes only recorded sizes appear.
pub type SourceEntries = Vec<(String, Option<ThumbnailMeta>)>;

/// Persistence for thumbnail metadata.
pub trait MetadataBackend: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    fn get(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>>;

    /// Every record for a source.
    fn get_all(&self, source_name: &str) -> Result<Vec<ThumbnailMeta>>;

    /// Store `meta`, replacing the record for the same source and size.
    ///
    /// Returns the replaced record so the caller can remove its file.
    fn save(&self, meta: &ThumbnailMeta) -> Result<Option<ThumbnailMeta>>;

    /// Remove the record for a source and size, returning it if it existed.
    fn delete(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>>;

    /// Batched lookups, when the backend supports them.
    fn as_batch(&self) -> Option<&dyn BatchMetadataBackend> {
        None
    }
}

/// Multi-source lookup served in a single backend round-trip.
pub trait BatchMetadataBackend {
    /// Look up many sources at once.
    ///
    /// The result has exactly one entry per source name, in input order.
    fn batch_get(&self, source_names: &[&str], sizes: Option<&[String]>) -> Result<Vec<SourceEntries>>;
}
