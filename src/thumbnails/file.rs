use std::fmt;
use std::sync::Arc;

use thumbforge_common::{Result, ThumbnailMeta};

use crate::storage::StorageBackend;

/// Identity of a source image: its storage name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceImage {
    name: String,
}

impl SourceImage {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for blank names, which cannot back a thumbnail manager.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

impl fmt::Display for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Handle to a generated thumbnail file.
#[derive(Clone)]
pub struct Thumbnail {
    meta: ThumbnailMeta,
    storage: Arc<dyn StorageBackend>,
}

impl Thumbnail {
    pub(crate) fn new(meta: ThumbnailMeta, storage: Arc<dyn StorageBackend>) -> Self {
        Self { meta, storage }
    }

    /// Storage name of the thumbnail file.
    pub fn name(&self) -> &str {
        &self.meta.thumbnail_name
    }

    pub fn size(&self) -> &str {
        &self.meta.size
    }

    pub fn source_name(&self) -> &str {
        &self.meta.source_name
    }

    pub fn meta(&self) -> &ThumbnailMeta {
        &self.meta
    }

    pub fn url(&self) -> String {
        self.storage.url(&self.meta.thumbnail_name)
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        self.storage.read(&self.meta.thumbnail_name)
    }

    pub fn exists(&self) -> bool {
        self.storage.exists(&self.meta.thumbnail_name)
    }
}

impl PartialEq for Thumbnail {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
    }
}

impl Eq for Thumbnail {}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("name", &self.meta.thumbnail_name)
            .field("size", &self.meta.size)
            .field("source", &self.meta.source_name)
            .finish()
    }
}
