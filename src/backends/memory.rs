use std::collections::HashMap;

use parking_lot::RwLock;
use thumbforge_common::{Result, ThumbnailMeta};

use super::MetadataBackend;

/// Process-local metadata backend.
///
/// Useful for tests and one-shot tools. It has no batch support.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<(String, String), String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl MetadataBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
        let records = self.records.read();
        Ok(records
            .get(&(source_name.to_string(), size.to_string()))
            .map(|name| ThumbnailMeta::new(source_name, name, size)))
    }

    fn get_all(&self, source_name: &str) -> Result<Vec<ThumbnailMeta>> {
        let records = self.records.read();
        let mut metas: Vec<_> = records
            .iter()
            .filter(|((source, _), _)| source == source_name)
            .map(|((source, size), name)| ThumbnailMeta::new(source, name, size))
            .collect();
        metas.sort_by(|a, b| a.size.cmp(&b.size));
        Ok(metas)
    }

    fn save(&self, meta: &ThumbnailMeta) -> Result<Option<ThumbnailMeta>> {
        let prior = self.records.write().insert(
            (meta.source_name.clone(), meta.size.clone()),
            meta.thumbnail_name.clone(),
        );
        Ok(prior.map(|name| ThumbnailMeta::new(&meta.source_name, name, &meta.size)))
    }

    fn delete(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
        let prior = self
            .records
            .write()
            .remove(&(source_name.to_string(), size.to_string()));
        Ok(prior.map(|name| ThumbnailMeta::new(source_name, name, size)))
    }
}
