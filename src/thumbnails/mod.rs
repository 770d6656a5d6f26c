//! Thumbnail lookup, generation, and caching.
//!
//! [`ThumbnailService`] holds the process-wide pieces: configured sizes with
//! their pipelines, and the injected metadata and storage backends.
//! [`ThumbnailManager`] binds the service to one source image and keeps a
//! per-instance cache of what the metadata backend said about each size, so
//! repeated lookups within one unit of work cost one backend round-trip.
//! [`fetch`] fills many managers' caches with a single batched lookup.

mod access;
mod cache;
mod file;
mod manager;
mod naming;
mod prefetch;
mod service;

pub use access::{validate_size_name, RESERVED_NAMES};
pub use cache::{Slot, ThumbnailCache};
pub use file::{SourceImage, Thumbnail};
pub use manager::ThumbnailManager;
pub use prefetch::fetch;
pub use service::{ServiceBuilder, SizeEntry, ThumbnailService, DEFAULT_BASEDIR};
