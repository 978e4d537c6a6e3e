//! hn-users
//!
//! Builds the author key set from downloaded items and fetches user details.

use std::path::PathBuf;

use clap::Parser;
use hn_harvest::{
    error::Result,
    models::Config,
    pipeline::{self, UserSteps},
    storage::LocalStorage,
};

/// hn-users - Downloads Hacker News users data
#[derive(Parser, Debug)]
#[command(name = "hn-users", version, about = "Downloads Hacker News users data")]
struct Cli {
    /// Path to the data directory
    #[arg(long)]
    data_path: PathBuf,

    /// Create a file with unique user names from all the item files
    #[arg(long)]
    create_users_file: bool,

    /// Download details for every user in the users file
    #[arg(long)]
    get_users_data: bool,

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
    let steps = UserSteps {
        create_users_file: cli.create_users_file,
        get_users_data: cli.get_users_data,
    };

    pipeline::run_users(&config, &storage, steps).await?;

    log::info!("Done!");
    Ok(())
}
