use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use thumbforge::cache::FreshnessPolicy;
use thumbforge::cli::{CliArgs, CompressionLevel};
use thumbforge::config::{CompressConfig, LoadedConfig, ThumbConfig, ThumbforgeConfig};
use thumbforge::pipeline::{Pipeline, default_workers, log_summary, process_batch};
use thumbforge::source::collect_image_paths;

#[allow(clippy::print_stderr)]
fn main() {
    match run() {
        Ok(true) => {}
        // Per-file failures were already logged in the summary
        Ok(false) => std::process::exit(1),
        Err(e) => {
            // Use eprintln instead of error! because logger may not be initialized
            // (e.g., config loading fails before logger init)
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every file was handled without error.
fn run() -> Result<bool> {
    let args = CliArgs::parse();

    // Load config if specified and merge with CLI args
    let merged = merge_config_with_args(&args)?;

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(if merged.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    info!("thumbforge v{}", env!("CARGO_PKG_VERSION"));

    let paths = collect_image_paths(&args.input)?;
    if paths.is_empty() {
        warn!("No supported image files found.");
        return Ok(true);
    }
    info!("Found {} images", paths.len());

    let pipeline = Pipeline::new(&merged.thumbs).context("failed to prepare thumbnail pipeline")?;

    let report = process_batch(
        &paths,
        &merged.output,
        merged.jobs,
        args.force,
        &pipeline,
        None, // No cancellation for CLI
    )?;
    log_summary(&report);

    Ok(report.is_clean())
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    output: PathBuf,
    jobs: usize,
    verbose: bool,
    thumbs: ThumbConfig,
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(args: &CliArgs) -> Result<MergedConfig> {
    // Load config if specified
    let loaded_config = if let Some(config_path) = &args.config {
        Some(
            LoadedConfig::load(config_path)
                .with_context(|| format!("failed to load config: {}", config_path.display()))?,
        )
    } else {
        None
    };
    let defaults = ThumbforgeConfig::default();
    let file_config = loaded_config.as_ref().map(|lc| &lc.config).unwrap_or(&defaults);

    // Output directory: CLI > config > default
    let output = args.output.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.resolve_output_dir())
            .unwrap_or_else(|| PathBuf::from(&defaults.output_dir))
    });

    // Worker count is CLI-only; 0 means all cores
    let jobs = args
        .jobs
        .filter(|&n| n > 0)
        .unwrap_or_else(default_workers);

    let font = args.font.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.resolve_font())
            .unwrap_or_else(|| PathBuf::from(&defaults.font))
    });

    let exiftool = args.exiftool.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.resolve_exiftool())
            .unwrap_or_else(|| PathBuf::from(&defaults.exiftool))
    });

    // Boolean flags: CLI presence wins, otherwise use config
    let label = !args.no_label && file_config.label;
    let freshness = if args.check_mtime || file_config.check_mtime {
        FreshnessPolicy::MTime
    } else {
        FreshnessPolicy::Exists
    };

    // Compress: CLI option overrides config
    let compress = if args.compress.is_some() {
        args.compress
    } else {
        file_config.compress.as_ref().map(|c| match c {
            CompressConfig::Level(n) => CompressionLevel::Level(*n),
            CompressConfig::Max(_) => CompressionLevel::Max,
        })
    };

    let thumbs = ThumbConfig {
        tiers: file_config.tiers.clone(),
        font,
        label,
        software: file_config.software.clone(),
        exiftool,
        exiftool_timeout: Duration::from_secs(file_config.exiftool_timeout_secs),
        freshness,
        compress,
    };

    Ok(MergedConfig {
        output,
        jobs,
        verbose: args.verbose,
        thumbs,
    })
}
