//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds a [`ThumbnailService`] over a
//! temporary directory and an in-memory SQLite database. Metadata calls go
//! through [`CountingBackend`] so tests can assert how many round-trips an
//! operation costs.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use thumbforge::backends::{BatchMetadataBackend, MetadataBackend, SourceEntries, SqliteBackend};
use thumbforge::storage::{FileSystemStorage, StorageBackend};
use thumbforge::thumbnails::{ServiceBuilder, ThumbnailManager, ThumbnailService};
use thumbforge::Result;
use thumbforge_common::{SizeSpec, ThumbnailMeta};

/// Metadata backend wrapper that counts reads and writes.
pub struct CountingBackend<B> {
    inner: B,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl<B> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.reads.store(0, Ordering::SeqCst);
        self.writes.store(0, Ordering::SeqCst);
    }
}

impl<B: MetadataBackend> MetadataBackend for CountingBackend<B> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn get(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(source_name, size)
    }

    fn get_all(&self, source_name: &str) -> Result<Vec<ThumbnailMeta>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_all(source_name)
    }

    fn save(&self, meta: &ThumbnailMeta) -> Result<Option<ThumbnailMeta>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.save(meta)
    }

    fn delete(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(source_name, size)
    }

    fn as_batch(&self) -> Option<&dyn BatchMetadataBackend> {
        self.inner
            .as_batch()
            .map(|_| self as &dyn BatchMetadataBackend)
    }
}

impl<B: MetadataBackend> BatchMetadataBackend for CountingBackend<B> {
    fn batch_get(
        &self,
        source_names: &[&str],
        sizes: Option<&[String]>,
    ) -> Result<Vec<SourceEntries>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.inner.as_batch() {
            Some(batch) => batch.batch_get(source_names, sizes),
            None => Ok(Vec::new()),
        }
    }
}

/// Service over a temporary directory and a counted SQLite backend.
pub struct TestHarness {
    pub service: ThumbnailService,
    pub metadata: Arc<CountingBackend<SqliteBackend>>,
    pub storage: Arc<FileSystemStorage>,
    pub dir: TempDir,
}

impl TestHarness {
    /// Harness with the sizes `small` (32x32), `default` (64x64) and `large` (128x128).
    pub fn new() -> Self {
        Self::with_builder(|builder| builder)
    }

    /// Harness whose service builder is customised by `configure` after the
    /// default sizes are added.
    pub fn with_builder(configure: impl FnOnce(ServiceBuilder) -> ServiceBuilder) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let storage = Arc::new(FileSystemStorage::new(dir.path(), "/media/"));
        let metadata = Arc::new(CountingBackend::new(
            SqliteBackend::in_memory().expect("failed to create in-memory backend"),
        ));

        let builder = ThumbnailService::builder(metadata.clone(), storage.clone())
            .size("small", SizeSpec::new(32, 32))
            .size("default", SizeSpec::new(64, 64))
            .size("large", SizeSpec::new(128, 128));
        let service = configure(builder)
            .build()
            .expect("failed to build service");

        Self {
            service,
            metadata,
            storage,
            dir,
        }
    }

    /// Store a synthesized PNG under `name` and return a manager for it.
    pub fn source(&self, name: &str) -> ThumbnailManager {
        let stored = self
            .storage
            .write(name, &png_bytes(200, 100))
            .expect("failed to store source");
        assert_eq!(stored, name, "source name already taken");
        self.service.manager(name)
    }
}

/// A `width` x `height` PNG with a gradient.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut out, ImageFormat::Png)
        .expect("failed to encode test image");
    out.into_inner()
}
