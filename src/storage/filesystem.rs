//! Local filesystem storage rooted at a base directory.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use thumbforge_common::{Error, Result};
use uuid::Uuid;

use super::StorageBackend;

/// Attempts at finding a free name before giving up.
const MAX_NAME_ATTEMPTS: usize = 16;

/// Stores files under `{location}/{name}` and serves them from `{base_url}{name}`.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    location: PathBuf,
    base_url: String,
}

impl FileSystemStorage {
    /// Create a new storage rooted at `location`.
    pub fn new(location: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            location: location.into(),
            base_url,
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Absolute path for a storage name.
    ///
    /// Rejects absolute names and names that escape the base directory.
    pub fn path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            return Err(Error::invalid_input(format!("Invalid storage name: {name}")));
        }
        Ok(self.location.join(relative))
    }
}

impl StorageBackend for FileSystemStorage {
    fn write(&self, name: &str, data: &[u8]) -> Result<String> {
        let path = self.path(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut candidate = name.to_string();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.path(&candidate)?;
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(data)?;
                    tracing::debug!(name = %candidate, bytes = data.len(), "Wrote file");
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = alternative_name(name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::invalid_input(format!(
            "No free storage name found for {name}"
        )))
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path(name)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::not_found(format!("File not found: {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}{}", self.base_url, name.trim_start_matches('/'))
    }

    fn exists(&self, name: &str) -> bool {
        self.path(name).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// `dir/stem.ext` → `dir/stem_1a2b3c4.ext`
fn alternative_name(name: &str) -> String {
    let suffix = &Uuid::new_v4().simple().to_string()[..7];
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    match name.rfind('/') {
        Some(idx) => format!("{}/{}", &name[..idx], file_name),
        None => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, FileSystemStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path(), "/media");
        (dir, storage)
    }

    #[test]
    fn test_write_read_delete() {
        let (_dir, storage) = storage();

        let name = storage.write("thumbs/a/one.png", b"data").unwrap();
        assert_eq!(name, "thumbs/a/one.png");
        assert!(storage.exists(&name));
        assert_eq!(storage.read(&name).unwrap(), b"data");

        storage.delete(&name).unwrap();
        assert!(!storage.exists(&name));
    }

    #[test]
    fn test_write_never_overwrites() {
        let (_dir, storage) = storage();

        let first = storage.write("thumbs/photo_large.png", b"first").unwrap();
        let second = storage.write("thumbs/photo_large.png", b"second").unwrap();

        assert_eq!(first, "thumbs/photo_large.png");
        assert_ne!(first, second);
        assert!(second.starts_with("thumbs/photo_large_"));
        assert!(second.ends_with(".png"));
        assert_eq!(storage.read(&first).unwrap(), b"first");
        assert_eq!(storage.read(&second).unwrap(), b"second");
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let (_dir, storage) = storage();
        assert!(storage.delete("nothing/here.png").is_ok());
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_dir, storage) = storage();
        assert!(matches!(storage.read("missing.png"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_rejects_escaping_names() {
        let (_dir, storage) = storage();
        assert!(matches!(storage.path("../etc/passwd"), Err(Error::InvalidInput(_))));
        assert!(matches!(storage.path("/etc/passwd"), Err(Error::InvalidInput(_))));
        assert!(matches!(storage.path(""), Err(Error::InvalidInput(_))));
        assert!(!storage.exists("../outside.png"));
    }

    #[test]
    fn test_url() {
        let storage = FileSystemStorage::new("/srv/media", "https://cdn.example.com/media");
        assert_eq!(
            storage.url("thumbs/a_small.png"),
            "https://cdn.example.com/media/thumbs/a_small.png"
        );
    }

    #[test]
    fn test_alternative_name_keeps_directory_and_extension() {
        let alt = alternative_name("thumbs/avatars/photo.png");
        assert!(alt.starts_with("thumbs/avatars/photo_"));
        assert!(alt.ends_with(".png"));
        assert_eq!(alt.len(), "thumbs/avatars/photo_".len() + 7 + ".png".len());

        let bare = alternative_name("README");
        assert!(bare.starts_with("README_"));
    }
}
