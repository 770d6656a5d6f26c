//! Member-style access to sizes, e.g. `member("small")` for `.small`.
//!
//! Only configured size names resolve. Everything else is an unknown member,
//! which is a different error from an unknown size passed to the explicit API.

use thumbforge_common::{Error, Result};

use super::file::Thumbnail;
use super::manager::ThumbnailManager;

/// Names taken by manager operations; sizes may not use them.
pub const RESERVED_NAMES: &[&str] = &["all", "get", "get_thumbnail", "create_thumbnail", "delete_thumbnail"];

/// Check that `name` can be used as a size name.
pub fn validate_size_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("Size name cannot be empty"));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(Error::invalid_input(format!(
            "Size name '{}' is reserved",
            name
        )));
    }
    Ok(())
}

impl ThumbnailManager {
    /// Resolve `name` as a size and return its thumbnail.
    ///
    /// Unconfigured names fail with [`Error::UnknownMember`] even when the
    /// manager has no source; configured ones behave like
    /// [`get_thumbnail`](ThumbnailManager::get_thumbnail).
    pub fn member(&mut self, name: &str) -> Result<Thumbnail> {
        if !self.service().has_size(name) {
            return Err(Error::unknown_member(name));
        }
        self.get_thumbnail(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_size_name() {
        assert!(validate_size_name("small").is_ok());
        assert!(validate_size_name("").is_err());
        assert!(validate_size_name("  ").is_err());
        for name in RESERVED_NAMES {
            assert!(validate_size_name(name).is_err());
        }
    }
}
