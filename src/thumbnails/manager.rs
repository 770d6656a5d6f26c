//! Lookup-or-generate logic for one source image.

use std::collections::BTreeMap;

use thumbforge_common::{Error, Result, ThumbnailMeta};

use super::cache::{Slot, ThumbnailCache};
use super::file::{SourceImage, Thumbnail};
use super::naming;
use super::service::ThumbnailService;

/// Thumbnails of one source image.
///
/// The manager remembers every backend answer in its [`ThumbnailCache`], so
/// a size costs at most one metadata round-trip per manager. Create and
/// delete update the cache along with the backend. Drop the manager at the
/// end of the unit of work; the cache is never persisted.
pub struct ThumbnailManager {
    service: ThumbnailService,
    source: Option<SourceImage>,
    cache: ThumbnailCache,
}

impl ThumbnailManager {
    pub fn new(service: ThumbnailService, source: Option<SourceImage>) -> Self {
        Self {
            service,
            source: source.filter(|s| !s.is_empty()),
            cache: ThumbnailCache::new(),
        }
    }

    /// The bound source, or [`Error::InvalidSource`] when there is none.
    pub fn source(&self) -> Result<&SourceImage> {
        self.source.as_ref().ok_or(Error::InvalidSource)
    }

    pub fn service(&self) -> &ThumbnailService {
        &self.service
    }

    pub fn cache(&self) -> &ThumbnailCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut ThumbnailCache {
        &mut self.cache
    }

    /// Number of sizes resolved so far, hits and misses alike.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Return the thumbnail for `size`, generating it when none exists.
    pub fn get_thumbnail(&mut self, size: &str) -> Result<Thumbnail> {
        let source = self.source()?.name().to_string();
        self.service.size(size)?;

        match self.cache.slot(size).cloned() {
            Some(Slot::Hit(meta)) => {
                tracing::trace!(source = %source, size, "Thumbnail cache hit");
                return Ok(self.service.thumbnail(meta));
            }
            Some(Slot::Miss) => return self.create_thumbnail(size),
            None => {}
        }

        match self.service.metadata().get(&source, size)? {
            Some(meta) => {
                tracing::debug!(source = %source, size, thumbnail = %meta.thumbnail_name, "Thumbnail found");
                self.cache.hit(meta.clone());
                Ok(self.service.thumbnail(meta))
            }
            None => {
                self.cache.miss(size);
                self.create_thumbnail(size)
            }
        }
    }

    /// Alias for [`get_thumbnail`](Self::get_thumbnail).
    pub fn get(&mut self, size: &str) -> Result<Thumbnail> {
        self.get_thumbnail(size)
    }

    /// Return the existing thumbnail for `size` without ever generating one.
    ///
    /// Fails with [`Error::NotFound`] when the backend has no record.
    pub fn lookup(&mut self, size: &str) -> Result<Thumbnail> {
        let source = self.source()?.name().to_string();
        self.service.size(size)?;

        let meta = match self.cache.slot(size).cloned() {
            Some(Slot::Hit(meta)) => Some(meta),
            Some(Slot::Miss) => None,
            None => {
                let found = self.service.metadata().get(&source, size)?;
                match &found {
                    Some(meta) => self.cache.hit(meta.clone()),
                    None => self.cache.miss(size),
                }
                found
            }
        };

        meta.map(|meta| self.service.thumbnail(meta))
            .ok_or_else(|| Error::not_found(format!("No {} thumbnail for {}", size, source)))
    }

    /// Generate the thumbnail for `size`, replacing any existing one.
    ///
    /// Storage and metadata are only written after the whole pipeline has
    /// succeeded. The file of a replaced record is deleted; failing to do so
    /// is logged and leaves an orphan file, not an error.
    pub fn create_thumbnail(&mut self, size: &str) -> Result<Thumbnail> {
        let source = self.source()?.name().to_string();
        let entry = self.service.size(size)?;

        let storage = self.service.storage();
        let original = storage.read(&source)?;
        let processed = entry.pipeline().run(&original, entry.spec())?;

        let name = naming::thumbnail_name(
            self.service.basedir(),
            &source,
            size,
            processed.format.extension(),
        );
        let stored = storage.write(&name, &processed.data)?;
        let meta = ThumbnailMeta::new(&source, stored, size);

        let prior = match self.service.metadata().save(&meta) {
            Ok(prior) => prior,
            Err(e) => {
                if let Err(cleanup) = storage.delete(&meta.thumbnail_name) {
                    tracing::warn!(thumbnail = %meta.thumbnail_name, error = %cleanup, "Failed to remove unrecorded thumbnail");
                }
                return Err(e);
            }
        };

        tracing::info!(
            source = %source,
            size,
            thumbnail = %meta.thumbnail_name,
            bytes = processed.data.len(),
            "Created thumbnail"
        );

        self.cache.hit(meta.clone());

        if let Some(prior) = prior.filter(|p| p.thumbnail_name != meta.thumbnail_name) {
            tracing::debug!(thumbnail = %prior.thumbnail_name, "Removing replaced thumbnail");
            if let Err(e) = storage.delete(&prior.thumbnail_name) {
                tracing::warn!(thumbnail = %prior.thumbnail_name, error = %e, "Failed to remove replaced thumbnail");
            }
        }

        Ok(self.service.thumbnail(meta))
    }

    /// Remove the thumbnail for `size` and its file. Missing ones are a no-op.
    pub fn delete_thumbnail(&mut self, size: &str) -> Result<()> {
        let source = self.source()?.name().to_string();
        self.service.size(size)?;

        let prior = self.service.metadata().delete(&source, size)?;
        self.cache.miss(size);

        if let Some(prior) = prior {
            self.service.storage().delete(&prior.thumbnail_name)?;
            tracing::info!(source = %source, size, thumbnail = %prior.thumbnail_name, "Deleted thumbnail");
        }
        Ok(())
    }

    /// Every existing thumbnail of the source, keyed by size name.
    ///
    /// The first call lists the backend once; later calls answer from the
    /// cache.
    pub fn all(&mut self) -> Result<BTreeMap<String, Thumbnail>> {
        let source = self.source()?.name().to_string();

        if !self.cache.is_complete() {
            let metas = self.service.metadata().get_all(&source)?;
            tracing::debug!(source = %source, count = metas.len(), "Listed thumbnails");
            self.cache.complete(metas, self.service.size_names());
        }

        Ok(self
            .cache
            .hits()
            .map(|meta| (meta.size.clone(), self.service.thumbnail(meta.clone())))
            .collect())
    }

    /// Delete every thumbnail of the source, e.g. after replacing it.
    pub fn delete_all(&mut self) -> Result<usize> {
        let sizes: Vec<String> = self.all()?.into_keys().collect();
        let source = self.source()?.name().to_string();

        for size in &sizes {
            let prior = self.service.metadata().delete(&source, size)?;
            self.cache.miss(size);
            if let Some(prior) = prior {
                self.service.storage().delete(&prior.thumbnail_name)?;
            }
        }

        tracing::info!(source = %source, count = sizes.len(), "Deleted all thumbnails");
        Ok(sizes.len())
    }

    /// Forget everything cached, so the next access asks the backend again.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use crate::storage::FileSystemStorage;
    use std::sync::Arc;
    use thumbforge_common::SizeSpec;

    fn service(dir: &std::path::Path) -> ThumbnailService {
        ThumbnailService::builder(
            Arc::new(MemoryBackend::new()),
            Arc::new(FileSystemStorage::new(dir, "/media/")),
        )
        .size("small", SizeSpec::new(8, 8))
        .build()
        .unwrap()
    }

    #[test]
    fn test_blank_source_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        for source in [None, Some(SourceImage::new("")), Some(SourceImage::new("  "))] {
            let mut manager = service.manager_for(source);
            assert!(matches!(manager.source(), Err(Error::InvalidSource)));
            assert!(matches!(manager.get_thumbnail("small"), Err(Error::InvalidSource)));
            assert!(matches!(manager.create_thumbnail("small"), Err(Error::InvalidSource)));
            assert!(matches!(manager.delete_thumbnail("small"), Err(Error::InvalidSource)));
            assert!(matches!(manager.lookup("small"), Err(Error::InvalidSource)));
            assert!(matches!(manager.all(), Err(Error::InvalidSource)));
            assert!(matches!(manager.member("small"), Err(Error::InvalidSource)));
        }
    }

    #[test]
    fn test_unknown_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = service(dir.path()).manager("photo.png");

        assert!(matches!(manager.get_thumbnail("huge"), Err(Error::UnknownSize(_))));
        assert!(matches!(manager.create_thumbnail("huge"), Err(Error::UnknownSize(_))));
        assert!(matches!(manager.delete_thumbnail("huge"), Err(Error::UnknownSize(_))));
        assert!(matches!(manager.member("huge"), Err(Error::UnknownMember(_))));
        assert_eq!(manager.cached_len(), 0);
    }

    #[test]
    fn test_missing_source_file_surfaces_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = service(dir.path()).manager("nowhere.png");
        assert!(matches!(manager.create_thumbnail("small"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_lookup_never_generates() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = service(dir.path()).manager("photo.png");

        assert!(matches!(manager.lookup("small"), Err(Error::NotFound(_))));
        assert_eq!(manager.cache().slot("small"), Some(&Slot::Miss));
    }
}
