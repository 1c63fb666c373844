//! tagdog - update tags in audio files
//!
//! Reads ID3 tags from every matching file under a directory, fills in missing
//! genres from the artist's Echo Nest terms, and writes the tags back.
//!
//! Exit status is 0 once the scan has run, even if individual files failed
//! (each failure is logged). Startup errors exit non-zero.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tagdog::config::{resolve_echonest_key, PipelineSettings};
use tagdog::services::{
    EchoNestClient, GenreCaseFixer, Id3Reader, Id3Writer, RateLimiter, TermFetcher,
};
use tagdog::TagPipeline;
use tagdog_common::config::{load_toml_config, LoggingConfig};

/// Command-line arguments for tagdog
#[derive(Parser, Debug)]
#[command(name = "tagdog")]
#[command(about = "Update tags in audio files")]
#[command(version)]
struct Args {
    /// Don't change files
    #[arg(long)]
    dry_run: bool,

    /// Your Echo Nest API key
    #[arg(long, value_name = "KEY")]
    echonest_key: Option<String>,

    /// Also re-case genres that are already tagged
    #[arg(long)]
    fix_genre_case: bool,

    /// Config file (default: <config dir>/tagdog/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// The directory to scan
    dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config =
        load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&toml_config.logging);

    let api_key = resolve_echonest_key(args.echonest_key.as_deref(), &toml_config)?;
    let settings = PipelineSettings::from_toml(&toml_config);

    let client = EchoNestClient::new(
        api_key,
        settings.echonest_base_url.as_str(),
        settings.request_timeout,
    )
    .context("Failed to create Echo Nest client")?;
    let rate_limiter = Arc::new(RateLimiter::new(settings.rate_limit));

    let mut pipeline = TagPipeline::new().with_dry_run(args.dry_run);
    pipeline
        .add_populator(Id3Reader::new()) // read artist and title from ID3 data
        .add_populator(
            TermFetcher::new(Arc::new(client), rate_limiter)
                .with_min_weight(settings.min_term_weight),
        ); // fetch terms and add as genre
    if args.fix_genre_case {
        pipeline.add_populator(GenreCaseFixer);
    }
    pipeline.add_writer(Id3Writer::new());

    if args.dry_run {
        info!("Dry run: no files will be changed");
    }

    let summary = pipeline
        .process_directory(&args.dir, settings.extensions.as_slice())
        .await
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;

    info!(
        "Done: {} matched, {} tagged, {} failed{}",
        summary.matched,
        summary.processed,
        summary.failed,
        if summary.dry_run { " (dry run)" } else { "" }
    );

    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tagdog={level},tagdog_common={level}",
            level = logging.level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
