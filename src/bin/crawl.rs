//! hn-crawl
//!
//! Downloads Hacker News items into bounds-named CSV partitions.

use std::path::PathBuf;

use clap::Parser;
use hn_harvest::{
    error::Result,
    models::Config,
    pipeline::{self, CrawlOptions},
    storage::LocalStorage,
};

/// hn-crawl - Downloads Hacker News data
#[derive(Parser, Debug)]
#[command(name = "hn-crawl", version, about = "Downloads Hacker News data")]
struct Cli {
    /// Path to the data directory
    #[arg(long)]
    data_path: PathBuf,

    /// Minimum created_at_i (default: creation time of the first item)
    #[arg(long)]
    min_created_at_i: Option<i64>,

    /// Maximum created_at_i (default: now plus a few seconds)
    #[arg(long)]
    max_created_at_i: Option<i64>,

    /// Continue below the oldest file already in the data directory
    #[arg(long)]
    resume: bool,

    /// Only fetch items newer than the newest file in the data directory
    #[arg(long)]
    incremental: bool,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let storage = LocalStorage::new(&cli.data_path);
    let options = CrawlOptions {
        min_created_at_i: cli.min_created_at_i,
        max_created_at_i: cli.max_created_at_i,
        resume: cli.resume,
        incremental: cli.incremental,
    };

    pipeline::run_crawler(&config, &storage, &options).await?;

    log::info!("Done!");
    Ok(())
}
