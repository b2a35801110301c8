//! shmatch - Rank catalog entries against one clip or a mix of two
//!
//! Usage:
//!   shmatch <clip>                              # rank against the catalog from settings
//!   shmatch <clip_a> <clip_b> --weight 80       # 80% clip_a, 20% clip_b
//!   shmatch <clip> --catalog db.json --json     # JSON with per-kind scores

use anyhow::Result;
use clap::Parser;
use spectrohash_cli::output::{print_json_results, print_table};
use spectrohash_core::{
    audio, compute_fingerprint_set, mix, rank_parallel, CatalogStore, FilesystemStore, PcmBuffer,
    Settings,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shmatch")]
#[command(about = "Find the catalog entries most similar to a clip", long_about = None)]
struct Args {
    /// Query clip
    clip_a: PathBuf,

    /// Optional second clip, mixed with the first
    clip_b: Option<PathBuf>,

    /// Percentage of the first clip in the mix (0-100)
    #[arg(short, long, default_value_t = 50.0, value_parser = parse_weight)]
    weight: f64,

    /// Cut the longer clip to the length of the shorter one before mixing
    #[arg(long)]
    trim: bool,

    /// Catalog file (.json or .bson); overrides the settings file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Path to settings file (TOML). Defaults to spectrohash.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_weight(value: &str) -> std::result::Result<f64, String> {
    let weight: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=100.0).contains(&weight) {
        Ok(weight)
    } else {
        Err(format!("weight must be between 0 and 100, got {weight}"))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Default: no logs (clean output for parsing)
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

    run_shmatch(&args)
}

/// The query clip: the first clip alone, or both clips mixed
fn load_query(args: &Args, settings: &Settings, weight: f64) -> Result<PcmBuffer> {
    let max_duration = settings.loader.max_duration();
    let first = audio::load(&args.clip_a, max_duration)?;

    let Some(clip_b) = &args.clip_b else {
        return Ok(first);
    };
    let mut first = first;
    let mut second = audio::load(clip_b, max_duration)?;
    if args.trim {
        let frames = first.frames().min(second.frames());
        first.truncate_frames(frames);
        second.truncate_frames(frames);
    }

    log::info!(
        "Mixing {} ({:.0}%) with {} ({:.0}%)",
        args.clip_a.display(),
        weight * 100.0,
        clip_b.display(),
        (1.0 - weight) * 100.0
    );
    Ok(mix(&first, &second, weight)?)
}

fn run_shmatch(args: &Args) -> Result<()> {
    let settings = Settings::resolve(args.config.as_deref())?;
    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| settings.catalog.path.clone());

    let weight = if args.clip_b.is_some() {
        args.weight / 100.0
    } else {
        1.0
    };

    let store = FilesystemStore::new(&catalog_path, settings.catalog.format);
    let catalog = store.load_all()?;

    let start = std::time::Instant::now();
    let query = load_query(args, &settings, weight)?;
    let query_set = compute_fingerprint_set(&query, &settings.engine)?;
    log::info!(
        "Query fingerprinted in {:.2}s: spectrogram={}",
        start.elapsed().as_secs_f64(),
        query_set.spectrogram
    );

    let results = rank_parallel(&query_set, &catalog)?;
    log::info!("Ranked {} catalog entries", results.len());

    if args.json {
        let query_paths: Vec<String> = std::iter::once(&args.clip_a)
            .chain(args.clip_b.as_ref())
            .map(|path| path.display().to_string())
            .collect();
        print_json_results(&query_paths, weight, &results);
    } else {
        print_table(&results);
    }

    Ok(())
}
