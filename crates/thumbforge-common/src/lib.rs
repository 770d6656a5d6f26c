//! Thumbforge-Common: Shared types and errors.
//!
//! This crate provides the data model used across thumbforge:
//!
//! - **Metadata**: [`ThumbnailMeta`], the persisted (source, size) → file record
//! - **Size specs**: [`SizeSpec`] with crop mode, output format and processor lists
//! - **Error Handling**: the [`Error`] taxonomy and [`Result`] alias
//!
//! # Examples
//!
//! ```
//! use thumbforge_common::{Error, Result, SizeSpec, ThumbnailMeta};
//!
//! let spec = SizeSpec::new(64, 64);
//! assert_eq!(spec.quality, 85);
//!
//! let meta = ThumbnailMeta::new("avatars/photo.png", "thumbs/avatars/abc_small.png", "small");
//! assert_eq!(meta.size, "small");
//!
//! fn example() -> Result<()> {
//!     Err(Error::unknown_size("huge"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
