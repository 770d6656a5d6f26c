//! Per-manager thumbnail cache.
//!
//! Each size has one slot. A size absent from the map is *unknown*: the
//! backend has not been asked yet. Once asked, the slot is either a
//! [`Slot::Hit`] or a [`Slot::Miss`] and stays so until a create or delete
//! on the same manager moves it.

use std::collections::HashMap;

use thumbforge_common::ThumbnailMeta;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// The backend holds this record.
    Hit(ThumbnailMeta),
    /// The backend holds no record for this size.
    Miss,
}

#[derive(Debug, Default)]
pub struct ThumbnailCache {
    slots: HashMap<String, Slot>,
    complete: bool,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while the size is still unknown.
    pub fn slot(&self, size: &str) -> Option<&Slot> {
        self.slots.get(size)
    }

    pub fn hit(&mut self, meta: ThumbnailMeta) {
        self.slots.insert(meta.size.clone(), Slot::Hit(meta));
    }

    pub fn miss(&mut self, size: &str) {
        self.slots.insert(size.to_string(), Slot::Miss);
    }

    /// Fill the cache from a full listing of the source's records.
    ///
    /// Every size in `known_sizes` without a record becomes a miss.
    pub fn complete<'a>(
        &mut self,
        metas: Vec<ThumbnailMeta>,
        known_sizes: impl IntoIterator<Item = &'a str>,
    ) {
        for size in known_sizes {
            self.miss(size);
        }
        for meta in metas {
            self.hit(meta);
        }
        self.complete = true;
    }

    /// Whether every size has been resolved by a full listing.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn hits(&self) -> impl Iterator<Item = &ThumbnailMeta> {
        self.slots.values().filter_map(|slot| match slot {
            Slot::Hit(meta) => Some(meta),
            Slot::Miss => None,
        })
    }

    /// Number of resolved slots, hits and misses alike.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.complete = false;
    }
}
