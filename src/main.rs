// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! pingallery: local photo gallery store
//!
//! Command-line front end. Each subcommand is one gesture on the gallery.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use pingallery::collection::PIN_LIMIT;
use pingallery::config::StorageBackend;
use pingallery::{AppConfig, Gallery, ImageRecord, PickedAsset, PinOutcome};

/// pingallery CLI - pinned photo gallery
#[derive(Parser, Debug)]
#[command(name = "pingallery")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Local photo gallery with pinned favorites and captions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "pingallery.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format for listings
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Keep the collection in memory only (nothing is saved)
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Gallery(GalleryCommands),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Initialize a gallery directory with a default configuration
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

/// Gestures that need an opened gallery
#[derive(Subcommand, Debug)]
enum GalleryCommands {
    /// List images in display order
    List,

    /// Import image files
    Import {
        /// Files to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// MIME type to record for every file
        #[arg(long)]
        mime: Option<String>,
    },

    /// Delete an image and its file
    Remove {
        id: String,
    },

    /// Pin or unpin an image
    Pin {
        id: String,
    },

    /// Set the caption of an image
    Caption {
        id: String,

        /// New caption (empty clears it)
        #[arg(default_value = "")]
        text: String,
    },

    /// Apply a new display order (every id, exactly once)
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List the files in the image directory
    Files,

    /// Delete the stored collection and every image file
    Reset {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },

    /// Empty the volatile cache directory
    ClearCache,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "pingallery.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {:?}", cli.config))?;
    if cli.ephemeral {
        config.storage.backend = StorageBackend::Memory;
    }

    match cli.command {
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        Some(Commands::Init { dir, force }) => run_init(dir, force),
        Some(Commands::Gallery(command)) => {
            let mut gallery = Gallery::open(&config)
                .await
                .with_context(|| format!("failed to open gallery in {}", config.data_dir))?;
            run_gallery_command(&mut gallery, command, &cli.format).await
        }
        None => {
            let gallery = Gallery::open(&config)
                .await
                .with_context(|| format!("failed to open gallery in {}", config.data_dir))?;
            print_records(gallery.records(), &cli.format)
        }
    }
}

async fn run_gallery_command(gallery: &mut Gallery, command: GalleryCommands, format: &str) -> anyhow::Result<()> {
    match command {
        GalleryCommands::List => print_records(gallery.records(), format)?,
        GalleryCommands::Import { paths, mime } => {
            let assets: Vec<PickedAsset> = paths
                .iter()
                .map(|p| {
                    let asset = PickedAsset::from_path(p);
                    match &mime {
                        Some(m) => asset.with_mime_type(m.clone()),
                        None => asset,
                    }
                })
                .collect();
            let added = gallery.import(&assets).await;
            for record in &added {
                println!("Imported {} as {}", record.id, record.filename);
            }
        }
        GalleryCommands::Remove { id } => {
            if !gallery.remove(&id).await {
                bail!("no image with id {}", id);
            }
            println!("Removed {}", id);
        }
        GalleryCommands::Pin { id } => match gallery.toggle_pin(&id) {
            PinOutcome::Pinned => println!("Pinned {}", id),
            PinOutcome::Unpinned => println!("Unpinned {}", id),
            PinOutcome::LimitReached => {
                warn!("Already {} pinned images; unpin one first", PIN_LIMIT);
            }
            PinOutcome::NotFound => bail!("no image with id {}", id),
        },
        GalleryCommands::Caption { id, text } => {
            if !gallery.set_caption(&id, text) {
                bail!("no image with id {}", id);
            }
            println!("Caption updated for {}", id);
        }
        GalleryCommands::Reorder { ids } => {
            gallery.reorder(&ids).context("order rejected")?;
            println!("Reordered {} images", ids.len());
        }
        GalleryCommands::Files => {
            for name in gallery.list_files().await {
                println!("{}", name);
            }
        }
        GalleryCommands::Reset { force } => {
            if !force {
                eprintln!("Use --force to confirm deleting every image");
                return Ok(());
            }
            gallery.reset().await;
            println!("Gallery reset");
        }
        GalleryCommands::ClearCache => {
            let removed = gallery.clear_cache().await;
            println!("Removed {} cache entries", removed);
        }
    }
    Ok(())
}

fn print_records(records: &[ImageRecord], format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No images. Add some with: pingallery import <files>");
        return Ok(());
    }
    for (i, record) in records.iter().enumerate() {
        let marker = if record.pinned { "*" } else { " " };
        println!("{:3}. {} {}  {}", i + 1, marker, record.id, record.filename);
        if !record.caption.is_empty() {
            println!("        {}", record.caption);
        }
    }
    Ok(())
}

fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Images: {:?}", config.images_dir());
            println!("  Cache: {:?}", config.cache_dir());
            println!("  Store: {:?} ({:?}, key '{}')", config.db_path(), config.storage.backend, config.storage.key);
        }
    }
    Ok(())
}

fn run_init(dir: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("pingallery.json");

    if config_path.exists() && !force {
        bail!("{:?} already exists. Use --force to overwrite", config_path);
    }

    let mut config = AppConfig::default();
    config.data_dir = target.join("gallery").to_string_lossy().into_owned();
    config.cache_dir = target.join("gallery").join("cache").to_string_lossy().into_owned();

    std::fs::create_dir_all(config.images_dir())?;
    std::fs::create_dir_all(config.cache_dir())?;
    config.save(&config_path)?;

    info!("Initialized gallery in {:?}", target);
    println!("Created:");
    println!("  - {}", config_path.display());
    println!("  - {}", config.images_dir().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["pingallery"]).unwrap();
        assert!(!cli.verbose);
        assert!(!cli.ephemeral);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_import_command() {
        let cli = Cli::try_parse_from([
            "pingallery", "import", "/tmp/a.jpg", "/tmp/b.png", "--mime", "image/png"
        ]).unwrap();

        match cli.command {
            Some(Commands::Gallery(GalleryCommands::Import { paths, mime })) => {
                assert_eq!(paths, vec![PathBuf::from("/tmp/a.jpg"), PathBuf::from("/tmp/b.png")]);
                assert_eq!(mime.as_deref(), Some("image/png"));
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_cli_import_requires_paths() {
        assert!(Cli::try_parse_from(["pingallery", "import"]).is_err());
    }

    #[test]
    fn test_cli_caption_defaults_to_empty() {
        let cli = Cli::try_parse_from(["pingallery", "caption", "abc"]).unwrap();
        match cli.command {
            Some(Commands::Gallery(GalleryCommands::Caption { id, text })) => {
                assert_eq!(id, "abc");
                assert_eq!(text, "");
            }
            _ => panic!("Expected Caption command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pingallery", "list", "--format", "json", "--ephemeral"]).unwrap();
        assert_eq!(cli.format, "json");
        assert!(cli.ephemeral);
        assert!(matches!(cli.command, Some(Commands::Gallery(GalleryCommands::List))));
    }

    #[test]
    fn test_cli_config_and_init_are_not_gallery_commands() {
        let cli = Cli::try_parse_from(["pingallery", "config", "validate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { action: ConfigCommands::Validate })));

        let cli = Cli::try_parse_from(["pingallery", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init { dir: None, force: true })));

        let cli = Cli::try_parse_from(["pingallery", "clear-cache"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Gallery(GalleryCommands::ClearCache))));
    }
}
