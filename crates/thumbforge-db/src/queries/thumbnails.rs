//! Thumbnail metadata queries.
//!
//! One row per `(source_name, size)`. Writes go through upserts so a new
//! thumbnail for an existing pair replaces the old record, and the replaced
//! record is handed back so the caller can remove its file.

use rusqlite::Connection;
use thumbforge_common::{Error, Result, ThumbnailMeta};

/// Parse metadata from a database row.
///
/// Expects columns in order: source_name, thumbnail_name, size.
fn parse_thumbnail_row(row: &rusqlite::Row) -> rusqlite::Result<ThumbnailMeta> {
    Ok(ThumbnailMeta {
        source_name: row.get(0)?,
        thumbnail_name: row.get(1)?,
        size: row.get(2)?,
    })
}

/// Get the record for one source and size.
///
/// # Returns
///
/// * `Ok(Some(ThumbnailMeta))` - The record if found
/// * `Ok(None)` - If no thumbnail is recorded for the pair
/// * `Err(Error)` - If a database error occurs
pub fn get_thumbnail(conn: &Connection, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
    let result = conn.query_row(
        "SELECT source_name, thumbnail_name, size
         FROM thumbnails
         WHERE source_name = :source_name AND size = :size",
        rusqlite::named_params! { ":source_name": source_name, ":size": size },
        parse_thumbnail_row,
    );

    match result {
        Ok(meta) => Ok(Some(meta)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get every record for a source, ordered by size name.
pub fn list_thumbnails(conn: &Connection, source_name: &str) -> Result<Vec<ThumbnailMeta>> {
    let mut stmt = conn
        .prepare(
            "SELECT source_name, thumbnail_name, size
             FROM thumbnails
             WHERE source_name = :source_name
             ORDER BY size",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let thumbnails = stmt
        .query_map(
            rusqlite::named_params! { ":source_name": source_name },
            parse_thumbnail_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(thumbnails)
}

/// Get the records for many sources with a single statement.
///
/// When `sizes` is given only those sizes are selected. Rows come back in no
/// particular order; callers group them by source.
pub fn list_for_sources(
    conn: &Connection,
    source_names: &[&str],
    sizes: Option<&[String]>,
) -> Result<Vec<ThumbnailMeta>> {
    if source_names.is_empty() || sizes.is_some_and(|s| s.is_empty()) {
        return Ok(Vec::new());
    }

    let mut sql = format!(
        "SELECT source_name, thumbnail_name, size FROM thumbnails WHERE source_name IN ({})",
        placeholders(source_names.len())
    );
    let mut params: Vec<&str> = source_names.to_vec();

    if let Some(sizes) = sizes {
        sql.push_str(&format!(" AND size IN ({})", placeholders(sizes.len())));
        params.extend(sizes.iter().map(String::as_str));
    }

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let thumbnails = stmt
        .query_map(rusqlite::params_from_iter(params), parse_thumbnail_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(thumbnails)
}

/// Insert or replace the record for `(meta.source_name, meta.size)`.
///
/// # Returns
///
/// * `Ok(Some(ThumbnailMeta))` - The record that was replaced
/// * `Ok(None)` - If the pair had no record before
/// * `Err(Error)` - If a database error occurs
pub fn upsert_thumbnail(conn: &Connection, meta: &ThumbnailMeta) -> Result<Option<ThumbnailMeta>> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let prior = get_thumbnail(&tx, &meta.source_name, &meta.size)?;

    tx.execute(
        "INSERT INTO thumbnails (source_name, size, thumbnail_name)
         VALUES (:source_name, :size, :thumbnail_name)
         ON CONFLICT(source_name, size) DO UPDATE SET
            thumbnail_name = excluded.thumbnail_name,
            updated_at = datetime('now')",
        rusqlite::named_params! {
            ":source_name": &meta.source_name,
            ":size": &meta.size,
            ":thumbnail_name": &meta.thumbnail_name,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(prior)
}

/// Delete the record for one source and size.
///
/// # Returns
///
/// * `Ok(Some(ThumbnailMeta))` - The deleted record
/// * `Ok(None)` - If there was nothing to delete
/// * `Err(Error)` - If a database error occurs
pub fn delete_thumbnail(conn: &Connection, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let prior = get_thumbnail(&tx, source_name, size)?;

    if prior.is_some() {
        tx.execute(
            "DELETE FROM thumbnails WHERE source_name = :source_name AND size = :size",
            rusqlite::named_params! { ":source_name": source_name, ":size": size },
        )
        .map_err(|e| Error::database(e.to_string()))?;
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(prior)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
