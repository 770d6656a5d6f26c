//! Thumbforge-DB: Thumbnail metadata persistence on SQLite
//!
//! This crate stores the `(source, size) → thumbnail file` mapping using
//! rusqlite with r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```
//! use thumbforge_common::ThumbnailMeta;
//! use thumbforge_db::pool::{init_memory_pool, get_conn};
//! use thumbforge_db::queries::thumbnails;
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let meta = ThumbnailMeta::new("photo.png", "thumbs/abc_small.png", "small");
//! thumbnails::upsert_thumbnail(&conn, &meta).unwrap();
//! assert_eq!(thumbnails::get_thumbnail(&conn, "photo.png", "small").unwrap(), Some(meta));
//! ```

pub mod migrations;
pub mod pool;
pub mod queries;
