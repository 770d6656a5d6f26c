//! Thumbforge - on-demand cached image thumbnails
//!
//! A [`ThumbnailManager`](thumbnails::ThumbnailManager) is bound to one source
//! image and produces named thumbnail sizes for it, generating each at most
//! once and remembering the result through a pluggable metadata backend.
//!
//! ```no_run
//! use thumbforge::config::{build_service, Config};
//!
//! # fn main() -> anyhow::Result<()> {
//! let service = build_service(&Config::default())?;
//! let mut manager = service.manager("avatars/photo.png");
//! let thumbnail = manager.get_thumbnail("small")?;
//! println!("{}", thumbnail.url());
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod processors;
pub mod storage;
pub mod thumbnails;

pub use thumbforge_common::{Error, Result};
