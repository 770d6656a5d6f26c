//! Storage names for generated files.
//!
//! Names carry a random UUID so a new file can never land on an unrelated
//! file that happens to sit at the conventional `<stem>_<size>.<ext>` path.

use std::path::Path;

use uuid::Uuid;

/// `<basedir>/<source dir>/<uuid>_<size>.<ext>`
pub(crate) fn thumbnail_name(basedir: &str, source_name: &str, size: &str, extension: &str) -> String {
    let file_name = format!("{}_{}.{}", Uuid::new_v4().simple(), size, extension);
    join([basedir, parent_dir(source_name), &file_name])
}

/// `<original dir>/<uuid>.<ext>`
pub(crate) fn source_name(original_name: &str, extension: Option<&str>) -> String {
    let file_name = match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext),
        None => Uuid::new_v4().simple().to_string(),
    };
    join([parent_dir(original_name), &file_name])
}

/// Lowercased extension of a storage name, if any.
pub(crate) fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

fn parent_dir(name: &str) -> &str {
    name.rfind('/').map(|idx| &name[..idx]).unwrap_or("")
}

fn join<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
