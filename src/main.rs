mod cli;

use thumbforge::config::{self, Config};
use thumbforge::thumbnails::{self, Thumbnail, ThumbnailService};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "thumbforge=trace,thumbforge_db=debug,thumbforge_common=debug".to_string()
        } else {
            "thumbforge=info,thumbforge_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Ingest { file, name } => ingest(&file, name.as_deref(), config_path),
        Commands::Generate { source, size } => {
            let service = load_service(config_path)?;
            let thumbnail = service.manager(&source).create_thumbnail(&size)?;
            print_thumbnail(&thumbnail);
            Ok(())
        }
        Commands::Get { source, size } => {
            let service = load_service(config_path)?;
            let thumbnail = service.manager(&source).get_thumbnail(&size)?;
            print_thumbnail(&thumbnail);
            Ok(())
        }
        Commands::Delete { source, size } => {
            let service = load_service(config_path)?;
            service.manager(&source).delete_thumbnail(&size)?;
            println!("Deleted {} thumbnail of {}", size, source);
            Ok(())
        }
        Commands::List { source, json } => list(&source, json, config_path),
        Commands::Prefetch { sources, sizes } => prefetch(&sources, &sizes, config_path),
        Commands::Sizes => {
            let service = load_service(config_path)?;
            for (name, spec) in service.sizes() {
                let format = spec
                    .format
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "source".to_string());
                println!(
                    "{}: {}x{} {} ({})",
                    name, spec.width, spec.height, spec.crop, format
                );
            }
            Ok(())
        }
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("thumbforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_service(config_path: Option<&Path>) -> Result<ThumbnailService> {
    let config = config::load_config_or_default(config_path)?;
    config::build_service(&config)
}

fn print_thumbnail(thumbnail: &Thumbnail) {
    println!("{}\t{}", thumbnail.name(), thumbnail.url());
}

fn ingest(file: &Path, name: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let original = match name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("Not a file: {:?}", file))?,
    };

    let data = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    let service = load_service(config_path)?;
    let source = service.save_source(&original, &data)?;

    println!("{}", source);
    Ok(())
}

fn list(source: &str, json: bool, config_path: Option<&Path>) -> Result<()> {
    let service = load_service(config_path)?;
    let thumbnails = service.manager(source).all()?;

    if json {
        let entries: serde_json::Map<String, serde_json::Value> = thumbnails
            .iter()
            .map(|(size, thumbnail)| {
                (
                    size.clone(),
                    serde_json::json!({
                        "name": thumbnail.name(),
                        "url": thumbnail.url(),
                    }),
                )
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if thumbnails.is_empty() {
        println!("No thumbnails for {}", source);
    } else {
        for (size, thumbnail) in &thumbnails {
            println!("{}\t{}\t{}", size, thumbnail.name(), thumbnail.url());
        }
    }

    Ok(())
}

fn prefetch(sources: &[String], sizes: &[String], config_path: Option<&Path>) -> Result<()> {
    let service = load_service(config_path)?;
    let mut managers: Vec<_> = sources.iter().map(|s| service.manager(s)).collect();

    let sizes: Vec<&str> = sizes.iter().map(String::as_str).collect();
    let sizes = if sizes.is_empty() {
        None
    } else {
        Some(sizes.as_slice())
    };
    thumbnails::fetch(&mut managers, sizes)?;

    for manager in &managers {
        let mut found: Vec<&str> = manager.cache().hits().map(|m| m.size.as_str()).collect();
        found.sort_unstable();
        println!("{}: {}", manager.source()?, found.join(", "));
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("✓ Configuration is valid");
    println!("  Basedir: {}", config.basedir);
    println!("  Storage: {:?}", config.storage.location);
    println!("  Metadata: {:?}", config.metadata);
    println!("  Sizes: {}", config.sizes.len());
    if let Some(size) = &config.resize_source_to {
        println!("  Resize sources to: {}", size);
    }

    Ok(())
}
