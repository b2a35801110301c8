//! shindex - Catalog builder
//!
//! Usage:
//!   shindex <audio_dir>                        # writes the catalog from settings
//!   shindex <audio_dir> --catalog db.bson      # custom catalog file
//!   shindex <audio_dir> --append               # add to an existing catalog

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use spectrohash_core::audio::{self, AudioFormat};
use spectrohash_core::{
    compute_fingerprint_set, Catalog, CatalogStore, FilesystemStore, FingerprintSet, Settings,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "shindex")]
#[command(about = "Fingerprint a folder of audio files into a catalog", long_about = None)]
struct Args {
    /// Folder containing the audio files to index (not searched recursively)
    audio_dir: PathBuf,

    /// Catalog file (.json or .bson); overrides the settings file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Add to the existing catalog instead of replacing it
    #[arg(short, long)]
    append: bool,

    /// Path to settings file (TOML). Defaults to spectrohash.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Default: no logs (clean JSON output for parsing)
    // Verbose: show Info level logs for debugging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    run_shindex(&args)
}

/// Supported audio files in `dir`, sorted by file name
fn audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read audio folder: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && AudioFormat::from_path(path).is_supported())
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn entry_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run_shindex(args: &Args) -> Result<()> {
    let settings = Settings::resolve(args.config.as_deref())?;
    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| settings.catalog.path.clone());

    if !args.audio_dir.is_dir() {
        anyhow::bail!("Audio folder not found: {}", args.audio_dir.display());
    }

    let files = audio_files(&args.audio_dir)?;
    log::info!(
        "Found {} audio files in {}, fingerprinting in parallel...",
        files.len(),
        args.audio_dir.display()
    );

    let start = std::time::Instant::now();
    let max_duration = settings.loader.max_duration();
    let fingerprinted: Vec<Option<(String, FingerprintSet)>> = files
        .par_iter()
        .map(|path| {
            let set = audio::load(path, max_duration)
                .and_then(|pcm| compute_fingerprint_set(&pcm, &settings.engine));
            match set {
                Ok(set) => {
                    log::info!("{} is hashed", path.display());
                    Some((entry_id(path), set))
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();

    let failed = fingerprinted.iter().filter(|entry| entry.is_none()).count();
    let catalog: Catalog = fingerprinted.into_iter().flatten().collect();
    let elapsed = start.elapsed();

    let store = FilesystemStore::new(&catalog_path, settings.catalog.format);
    if args.append {
        store.append_all(&catalog)?;
    } else {
        store.write_all(&catalog)?;
    }

    let result = serde_json::json!({
        "status": "success",
        "catalog": catalog_path.display().to_string(),
        "mode": if args.append { "append" } else { "write" },
        "indexed": catalog.len(),
        "failed": failed,
        "processing_time_seconds": elapsed.as_secs_f64(),
    });
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
