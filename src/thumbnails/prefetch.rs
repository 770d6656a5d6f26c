//! Batched cache warm-up for many managers.

use thumbforge_common::{Error, Result};

use super::manager::ThumbnailManager;

/// Fill the caches of `managers` with one batched metadata lookup.
///
/// All managers are expected to share the first manager's metadata backend,
/// which must support batching or [`Error::UnsupportedBackend`] is returned.
/// Results are matched to managers by position.
///
/// With `sizes`, only those sizes are looked up; a size with no record is
/// left unknown so a later lookup still asks the backend. Without `sizes`,
/// every record is loaded and the manager's cache is marked complete, as
/// after [`ThumbnailManager::all`]. An empty `sizes` slice counts as none.
pub fn fetch(managers: &mut [ThumbnailManager], sizes: Option<&[&str]>) -> Result<()> {
    let service = match managers.first() {
        Some(first) => first.service().clone(),
        None => return Ok(()),
    };

    let backend = service.metadata();
    let batch = backend.as_batch().ok_or_else(|| {
        Error::unsupported_backend(format!(
            "the {} metadata backend does not support batched lookups",
            backend.name()
        ))
    })?;

    let sizes: Option<Vec<String>> = sizes
        .filter(|sizes| !sizes.is_empty())
        .map(|sizes| {
            sizes
                .iter()
                .map(|size| service.size(size).map(|_| size.to_string()))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?;

    let source_names = managers
        .iter()
        .map(|m| m.source().map(|s| s.name().to_string()))
        .collect::<Result<Vec<_>>>()?;
    let names: Vec<&str> = source_names.iter().map(String::as_str).collect();

    let results = batch.batch_get(&names, sizes.as_deref())?;
    if results.len() != managers.len() {
        return Err(Error::database(format!(
            "batched lookup returned {} results for {} sources",
            results.len(),
            managers.len()
        )));
    }

    let mut hits = 0;
    for (manager, entries) in managers.iter_mut().zip(results) {
        let metas: Vec<_> = entries.into_iter().filter_map(|(_, meta)| meta).collect();
        hits += metas.len();

        let cache = manager.cache_mut();
        if sizes.is_some() {
            for meta in metas {
                cache.hit(meta);
            }
        } else {
            cache.complete(metas, service.size_names());
        }
    }

    tracing::debug!(
        sources = managers.len(),
        sizes = ?sizes,
        hits,
        backend = backend.name(),
        "Prefetched thumbnails"
    );

    Ok(())
}
