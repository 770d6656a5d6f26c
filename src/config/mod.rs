mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::backends::{MemoryBackend, MetadataBackend, RedisBackend, SqliteBackend};
use crate::storage::FileSystemStorage;
use crate::thumbnails::{validate_size_name, ThumbnailService};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./thumbforge.toml",
        "~/.config/thumbforge/config.toml",
        "/etc/thumbforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.sizes.is_empty() {
        anyhow::bail!("At least one thumbnail size must be configured");
    }

    for (name, size) in &config.sizes {
        validate_size_name(name).with_context(|| format!("Invalid size name '{}'", name))?;

        if size.width == 0 || size.height == 0 {
            anyhow::bail!(
                "Size '{}' has an empty box ({}x{})",
                name,
                size.width,
                size.height
            );
        }
        if !(1..=100).contains(&size.quality) {
            anyhow::bail!(
                "Size '{}' has quality {} outside 1-100",
                name,
                size.quality
            );
        }
    }

    if let Some(size) = &config.resize_source_to {
        if !config.sizes.contains_key(size) {
            anyhow::bail!("resize_source_to names unknown size '{}'", size);
        }
    }

    if config.basedir.trim_matches('/').is_empty() {
        anyhow::bail!("basedir cannot be empty");
    }

    if let MetadataConfig::Redis { url, .. } = &config.metadata {
        if url.is_empty() {
            anyhow::bail!("Redis metadata backend has no url");
        }
    }

    if !config.storage.location.exists() {
        tracing::warn!(
            "Storage location does not exist: {:?}",
            config.storage.location
        );
    }

    Ok(())
}

/// Connect the configured metadata backend.
pub fn build_metadata(config: &MetadataConfig) -> Result<Arc<dyn MetadataBackend>> {
    let backend: Arc<dyn MetadataBackend> = match config {
        MetadataConfig::Sqlite { path } => {
            let path = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            Arc::new(
                SqliteBackend::open(&path)
                    .with_context(|| format!("Failed to open metadata database: {}", path))?,
            )
        }
        MetadataConfig::Redis { url, prefix } => Arc::new(
            RedisBackend::connect(url, prefix.clone())
                .with_context(|| format!("Failed to connect to Redis at {}", url))?,
        ),
        MetadataConfig::Memory => Arc::new(MemoryBackend::new()),
    };

    tracing::debug!(backend = backend.name(), "Metadata backend ready");
    Ok(backend)
}

/// Wire up storage, metadata and sizes into a [`ThumbnailService`].
pub fn build_service(config: &Config) -> Result<ThumbnailService> {
    let location = shellexpand::tilde(&config.storage.location.to_string_lossy()).into_owned();
    let storage = Arc::new(FileSystemStorage::new(
        location,
        config.storage.base_url.clone(),
    ));
    let metadata = build_metadata(&config.metadata)?;

    let service = ThumbnailService::builder(metadata, storage)
        .sizes(config.sizes.clone())
        .basedir(config.basedir.clone())
        .resize_source_to(config.resize_source_to.clone())
        .build()
        .context("Failed to build thumbnail service")?;

    Ok(service)
}
