use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thumbforge_common::SizeSpec;

use crate::backends::DEFAULT_KEY_PREFIX;
use crate::thumbnails::DEFAULT_BASEDIR;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory prefix for thumbnails inside storage
    #[serde(default = "default_basedir")]
    pub basedir: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default = "default_sizes")]
    pub sizes: BTreeMap<String, SizeSpec>,

    /// Size whose pipeline is applied to source images when they are stored
    #[serde(default)]
    pub resize_source_to: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            basedir: default_basedir(),
            storage: StorageConfig::default(),
            metadata: MetadataConfig::default(),
            sizes: default_sizes(),
            resize_source_to: None,
        }
    }
}

fn default_basedir() -> String {
    DEFAULT_BASEDIR.to_string()
}

fn default_sizes() -> BTreeMap<String, SizeSpec> {
    BTreeMap::from([
        ("small".to_string(), SizeSpec::new(64, 64)),
        ("default".to_string(), SizeSpec::new(128, 128)),
        ("large".to_string(), SizeSpec::new(512, 512)),
    ])
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for source images and thumbnails
    #[serde(default = "default_location")]
    pub location: PathBuf,

    /// URL prefix under which `location` is served
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_location() -> PathBuf {
    PathBuf::from("./media")
}

fn default_base_url() -> String {
    "/media/".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum MetadataConfig {
    Sqlite {
        #[serde(default = "default_db_path")]
        path: PathBuf,
    },
    Redis {
        url: String,

        #[serde(default = "default_prefix")]
        prefix: String,
    },
    /// Process-local, lost on exit; no batched lookups
    Memory,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./thumbforge.db")
}

fn default_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_db_path(),
        }
    }
}
