//! Transcoding cache (kiez-tc) - cache warming entry point
//!
//! Produces cached renditions for the given source files, sharing work
//! between duplicate requests exactly as the byte-serving endpoint does.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiez_common::config::{default_config_path, load_toml_config, resolve_data_dir, resolve_transcode_dir};
use kiez_tc::{FfmpegTranscoder, TranscodeCache, TranscodeSettings};

/// Command-line arguments for kiez-tc
#[derive(Parser, Debug)]
#[command(name = "kiez-tc")]
#[command(about = "Warm the Kiez transcoding cache")]
#[command(version)]
struct Args {
    /// Source files to transcode (relative paths resolve against the data folder)
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Config file (default: <config dir>/kiez/config.toml)
    #[arg(short, long, env = "KIEZ_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder containing uploaded music files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Folder for cached renditions
    #[arg(short, long, env = "KIEZ_TRANSCODE_DIR")]
    transcode_dir: Option<PathBuf>,

    /// Transcoder binary
    #[arg(long, env = "KIEZ_TRANSCODER")]
    transcoder: Option<PathBuf>,

    /// Seconds to wait for one transcode (0 waits forever)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => default_config_path().context("Failed to locate config file")?,
    };
    let config = load_toml_config(&config_path).context("Failed to load configuration")?;

    // Initialize tracing
    let default_filter = config
        .logging
        .level
        .clone()
        .unwrap_or_else(|| "kiez_tc=info,kiez_common=info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config);
    let transcode_dir = resolve_transcode_dir(args.transcode_dir.as_deref(), &config, &data_dir);

    let mut settings = TranscodeSettings::from_config(&config, &data_dir);
    settings.output_dir = transcode_dir;
    if let Some(secs) = args.timeout_secs {
        settings.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    let transcoder = FfmpegTranscoder::new(
        args.transcoder
            .clone()
            .unwrap_or_else(|| PathBuf::from(config.transcoder())),
    );

    info!("Data folder: {}", data_dir.display());
    info!("Transcode folder: {}", settings.output_dir.display());
    info!("Transcoder: {}", transcoder.binary().display());

    let cache = Arc::new(TranscodeCache::new(settings, Arc::new(transcoder)));

    let jobs = args.sources.iter().map(|source| {
        let cache = Arc::clone(&cache);
        let source = data_dir.join(source);
        async move {
            let result = cache.get_or_create(&source).await;
            (source, result)
        }
    });

    let mut failures = 0usize;
    for (source, result) in join_all(jobs).await {
        match result {
            Ok(cached) => println!("{} -> {}", source.display(), cached.display()),
            Err(e) => {
                failures += 1;
                error!(source = %source.display(), error = %e, "Failed to cache source");
            }
        }
    }

    if failures > 0 {
        error!("{} of {} sources failed", failures, args.sources.len());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
