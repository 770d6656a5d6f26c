//! Process-wide thumbnail context shared by every manager.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thumbforge_common::{Error, Result, SizeSpec, ThumbnailMeta};

use super::access::validate_size_name;
use super::file::{SourceImage, Thumbnail};
use super::manager::ThumbnailManager;
use super::naming;
use crate::backends::MetadataBackend;
use crate::processors::Pipeline;
use crate::storage::StorageBackend;

/// Directory prefix for generated thumbnails inside storage.
pub const DEFAULT_BASEDIR: &str = "thumbs";

/// A configured size together with its ready-to-run pipeline.
pub struct SizeEntry {
    spec: SizeSpec,
    pipeline: Pipeline,
}

impl SizeEntry {
    pub fn spec(&self) -> &SizeSpec {
        &self.spec
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

struct ServiceInner {
    sizes: BTreeMap<String, SizeEntry>,
    metadata: Arc<dyn MetadataBackend>,
    storage: Arc<dyn StorageBackend>,
    basedir: String,
    resize_source_to: Option<String>,
}

/// Sizes, pipelines and backends, cheap to clone and share.
#[derive(Clone)]
pub struct ThumbnailService {
    inner: Arc<ServiceInner>,
}

impl ThumbnailService {
    pub fn builder(
        metadata: Arc<dyn MetadataBackend>,
        storage: Arc<dyn StorageBackend>,
    ) -> ServiceBuilder {
        ServiceBuilder {
            sizes: BTreeMap::new(),
            pipelines: HashMap::new(),
            metadata,
            storage,
            basedir: DEFAULT_BASEDIR.to_string(),
            resize_source_to: None,
        }
    }

    /// Manager for the source stored under `source_name`.
    pub fn manager(&self, source_name: &str) -> ThumbnailManager {
        self.manager_for(Some(SourceImage::new(source_name)))
    }

    /// Manager for a possibly unset source.
    ///
    /// A missing or blank source still yields a manager, but every operation
    /// on it fails with [`Error::InvalidSource`].
    pub fn manager_for(&self, source: Option<SourceImage>) -> ThumbnailManager {
        ThumbnailManager::new(self.clone(), source)
    }

    /// Look up a configured size.
    pub fn size(&self, name: &str) -> Result<&SizeEntry> {
        self.inner
            .sizes
            .get(name)
            .ok_or_else(|| Error::unknown_size(name))
    }

    pub fn has_size(&self, name: &str) -> bool {
        self.inner.sizes.contains_key(name)
    }

    /// Configured size names in sorted order.
    pub fn size_names(&self) -> impl Iterator<Item = &str> {
        self.inner.sizes.keys().map(String::as_str)
    }

    pub fn sizes(&self) -> impl Iterator<Item = (&str, &SizeSpec)> {
        self.inner
            .sizes
            .iter()
            .map(|(name, entry)| (name.as_str(), &entry.spec))
    }

    pub fn metadata(&self) -> &dyn MetadataBackend {
        self.inner.metadata.as_ref()
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.inner.storage.as_ref()
    }

    pub fn basedir(&self) -> &str {
        &self.inner.basedir
    }

    pub fn resize_source_to(&self) -> Option<&str> {
        self.inner.resize_source_to.as_deref()
    }

    pub(crate) fn thumbnail(&self, meta: ThumbnailMeta) -> Thumbnail {
        Thumbnail::new(meta, Arc::clone(&self.inner.storage))
    }

    /// Store a newly uploaded source image.
    ///
    /// When `resize_source_to` is configured the image goes through that
    /// size's pipeline first. The file is stored under a fresh random name in
    /// the directory of `original_name`.
    pub fn save_source(&self, original_name: &str, data: &[u8]) -> Result<SourceImage> {
        let (data, extension) = match self.resize_source_to() {
            Some(size) => {
                let entry = self.size(size)?;
                let processed = entry.pipeline.run(data, &entry.spec)?;
                (processed.data, Some(processed.format.extension().to_string()))
            }
            None => (data.to_vec(), naming::extension(original_name)),
        };

        let name = naming::source_name(original_name, extension.as_deref());
        let stored = self.storage().write(&name, &data)?;

        tracing::info!(
            original = original_name,
            source = %stored,
            resized = self.resize_source_to().is_some(),
            "Stored source image"
        );

        Ok(SourceImage::new(stored))
    }
}

/// Builder for [`ThumbnailService`].
pub struct ServiceBuilder {
    sizes: BTreeMap<String, SizeSpec>,
    pipelines: HashMap<String, Pipeline>,
    metadata: Arc<dyn MetadataBackend>,
    storage: Arc<dyn StorageBackend>,
    basedir: String,
    resize_source_to: Option<String>,
}

impl ServiceBuilder {
    /// Add a named size. Its pipeline is built from the spec.
    pub fn size(mut self, name: impl Into<String>, spec: SizeSpec) -> Self {
        self.sizes.insert(name.into(), spec);
        self
    }

    pub fn sizes(mut self, sizes: impl IntoIterator<Item = (String, SizeSpec)>) -> Self {
        self.sizes.extend(sizes);
        self
    }

    /// Use a hand-built pipeline for a size instead of the spec's.
    pub fn pipeline(mut self, size: impl Into<String>, pipeline: Pipeline) -> Self {
        self.pipelines.insert(size.into(), pipeline);
        self
    }

    pub fn basedir(mut self, basedir: impl Into<String>) -> Self {
        self.basedir = basedir.into();
        self
    }

    pub fn resize_source_to(mut self, size: Option<String>) -> Self {
        self.resize_source_to = size;
        self
    }

    pub fn build(mut self) -> Result<ThumbnailService> {
        if let Some(size) = &self.resize_source_to {
            if !self.sizes.contains_key(size) {
                return Err(Error::unknown_size(size.clone()));
            }
        }
        if let Some(size) = self.pipelines.keys().find(|s| !self.sizes.contains_key(*s)) {
            return Err(Error::unknown_size(size.clone()));
        }

        let mut sizes = BTreeMap::new();
        for (name, spec) in self.sizes {
            validate_size_name(&name)?;
            let pipeline = match self.pipelines.remove(&name) {
                Some(pipeline) => pipeline,
                None => Pipeline::from_spec(&spec)?,
            };
            sizes.insert(name, SizeEntry { spec, pipeline });
        }

        tracing::debug!(
            sizes = ?sizes.keys().collect::<Vec<_>>(),
            metadata = self.metadata.name(),
            basedir = %self.basedir,
            "Built thumbnail service"
        );

        Ok(ThumbnailService {
            inner: Arc::new(ServiceInner {
                sizes,
                metadata: self.metadata,
                storage: self.storage,
                basedir: self.basedir,
                resize_source_to: self.resize_source_to,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use crate::storage::FileSystemStorage;
    use image::{DynamicImage, GenericImageView, RgbImage};
    use thumbforge_common::OutputFormat;

    fn builder(dir: &std::path::Path) -> ServiceBuilder {
        ThumbnailService::builder(
            Arc::new(MemoryBackend::new()),
            Arc::new(FileSystemStorage::new(dir, "/media/")),
        )
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        crate::processors::encode(&img, OutputFormat::Png, 100).unwrap()
    }

    #[test]
    fn test_size_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let service = builder(dir.path())
            .size("small", SizeSpec::new(64, 64))
            .build()
            .unwrap();

        assert!(service.has_size("small"));
        assert_eq!(service.size("small").unwrap().spec().width, 64);
        assert!(matches!(service.size("huge"), Err(Error::UnknownSize(s)) if s == "huge"));
        assert_eq!(service.size_names().collect::<Vec<_>>(), vec!["small"]);
        assert_eq!(service.basedir(), DEFAULT_BASEDIR);
    }

    #[test]
    fn test_build_rejects_unknown_resize_source_to() {
        let dir = tempfile::tempdir().unwrap();
        let result = builder(dir.path())
            .size("small", SizeSpec::new(64, 64))
            .resize_source_to(Some("huge".to_string()))
            .build();
        assert!(matches!(result, Err(Error::UnknownSize(_))));
    }

    #[test]
    fn test_build_rejects_reserved_size_name() {
        let dir = tempfile::tempdir().unwrap();
        let result = builder(dir.path()).size("all", SizeSpec::new(8, 8)).build();
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_save_source_uses_fresh_name() {
        let dir = tempfile::tempdir().unwrap();
        let service = builder(dir.path())
            .size("small", SizeSpec::new(64, 64))
            .build()
            .unwrap();

        let data = png(10, 10);
        let first = service.save_source("avatars/photo.png", &data).unwrap();
        let second = service.save_source("avatars/photo.png", &data).unwrap();

        assert_ne!(first, second);
        assert!(first.name().starts_with("avatars/"));
        assert!(first.name().ends_with(".png"));
        assert_eq!(service.storage().read(first.name()).unwrap(), data);
    }

    #[test]
    fn test_save_source_resizes_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let service = builder(dir.path())
            .size("max", SizeSpec::new(50, 50).with_format(OutputFormat::Jpeg))
            .resize_source_to(Some("max".to_string()))
            .build()
            .unwrap();

        let source = service.save_source("uploads/big.png", &png(200, 100)).unwrap();
        assert!(source.name().ends_with(".jpg"));

        let stored = service.storage().read(source.name()).unwrap();
        let decoded = image::load_from_memory(&stored).unwrap();
        assert_eq!(decoded.dimensions(), (50, 25));
    }
}
