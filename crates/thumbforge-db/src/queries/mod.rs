//! Database query modules.
//!
//! - thumbnails: thumbnail metadata CRUD and batched lookups

pub mod thumbnails;
