//! Thumbnail file storage.
//!
//! Storage holds file bytes only; which file belongs to which source and size
//! is tracked separately by a [`MetadataBackend`](crate::backends::MetadataBackend).
//! Names are relative, `/`-separated paths.

mod filesystem;

pub use filesystem::FileSystemStorage;

use thumbforge_common::Result;

/// Durable byte storage addressed by relative name.
pub trait StorageBackend: Send + Sync {
    /// Write `data` under `name` without overwriting existing files.
    ///
    /// Returns the name actually used, which differs from `name` when a file
    /// already exists there.
    fn write(&self, name: &str, data: &[u8]) -> Result<String>;

    /// Read the full contents of `name`.
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Delete `name`. Deleting a missing file is not an error.
    fn delete(&self, name: &str) -> Result<()>;

    /// Public URL for `name`.
    fn url(&self, name: &str) -> String;

    fn exists(&self, name: &str) -> bool;
}
