//! SQLite metadata backend backed by `thumbforge-db`.

use std::collections::HashMap;

use thumbforge_common::{Result, ThumbnailMeta};
use thumbforge_db::pool::{get_conn, init_memory_pool, init_pool, DbPool};
use thumbforge_db::queries::thumbnails;

use super::{BatchMetadataBackend, MetadataBackend, SourceEntries};

/// Metadata stored in the `thumbnails` table of a SQLite database.
///
/// Batched lookups are a single `SELECT ... WHERE source_name IN (...)`.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: DbPool,
}

impl SqliteBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (creating and migrating if needed) the database at `path`.
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self::new(init_pool(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(init_memory_pool()?))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl MetadataBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn get(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
        let conn = get_conn(&self.pool)?;
        thumbnails::get_thumbnail(&conn, source_name, size)
    }

    fn get_all(&self, source_name: &str) -> Result<Vec<ThumbnailMeta>> {
        let conn = get_conn(&self.pool)?;
        thumbnails::list_thumbnails(&conn, source_name)
    }

    fn save(&self, meta: &ThumbnailMeta) -> Result<Option<ThumbnailMeta>> {
        let conn = get_conn(&self.pool)?;
        thumbnails::upsert_thumbnail(&conn, meta)
    }

    fn delete(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
        let conn = get_conn(&self.pool)?;
        thumbnails::delete_thumbnail(&conn, source_name, size)
    }

    fn as_batch(&self) -> Option<&dyn BatchMetadataBackend> {
        Some(self)
    }
}

impl BatchMetadataBackend for SqliteBackend {
    fn batch_get(&self, source_names: &[&str], sizes: Option<&[String]>) -> Result<Vec<SourceEntries>> {
        let conn = get_conn(&self.pool)?;
        let rows = thumbnails::list_for_sources(&conn, source_names, sizes)?;

        let mut by_source: HashMap<String, HashMap<String, ThumbnailMeta>> = HashMap::new();
        for meta in rows {
            by_source
                .entry(meta.source_name.clone())
                .or_default()
                .insert(meta.size.clone(), meta);
        }

        Ok(source_names
            .iter()
            .map(|source| {
                let found = by_source.get(*source);
                match sizes {
                    Some(sizes) => sizes
                        .iter()
                        .map(|size| (size.clone(), found.and_then(|f| f.get(size)).cloned()))
                        .collect(),
                    None => {
                        let mut entries: SourceEntries = found
                            .map(|f| {
                                f.iter()
                                    .map(|(size, meta)| (size.clone(), Some(meta.clone())))
                                    .collect()
                            })
                            .unwrap_or_default();
                        entries.sort_by(|a, b| a.0.cmp(&b.0));
                        entries
                    }
                }
            })
            .collect())
    }
}
