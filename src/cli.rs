use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "thumbforge")]
#[command(author, version, about = "On-demand cached image thumbnails")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a source image and print its storage name
    Ingest {
        /// Image file to store
        #[arg(required = true)]
        file: PathBuf,

        /// Storage name to derive the stored name from (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Generate a thumbnail, replacing any existing one
    Generate {
        /// Storage name of the source image
        source: String,

        /// Size name
        size: String,
    },

    /// Print a thumbnail, generating it if missing
    Get {
        /// Storage name of the source image
        source: String,

        /// Size name
        size: String,
    },

    /// Delete a thumbnail and its metadata
    Delete {
        /// Storage name of the source image
        source: String,

        /// Size name
        size: String,
    },

    /// List the existing thumbnails of a source image
    List {
        /// Storage name of the source image
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up thumbnails of many source images in one batch
    Prefetch {
        /// Storage names of the source images
        #[arg(required = true)]
        sources: Vec<String>,

        /// Restrict the lookup to these sizes
        #[arg(long = "size")]
        sizes: Vec<String>,
    },

    /// List the configured sizes
    Sizes,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
