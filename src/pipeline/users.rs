// src/pipeline/users.rs

//! User extraction pipeline.

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::crawl::rate_limited;
use crate::services::{UserCrawler, create_users_file};
use crate::storage::LocalStorage;
use crate::utils::http::{Fetch, HttpFetcher};

/// Which user steps to run. Either, both or neither may be set.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserSteps {
    pub create_users_file: bool,
    pub get_users_data: bool,
}

/// Run the requested user steps against the live API.
pub async fn run_users(config: &Config, storage: &LocalStorage, steps: UserSteps) -> Result<()> {
    let http = HttpFetcher::from_config(&config.api)?;
    run_users_through(http, config, storage, steps).await
}

/// Run the requested user steps with every request going through `inner`
/// under the same rate limit as the crawl.
pub async fn run_users_through<F: Fetch>(
    inner: F,
    config: &Config,
    storage: &LocalStorage,
    steps: UserSteps,
) -> Result<()> {
    let fetcher = rate_limited(inner, config);
    users_with(&fetcher, config, storage, steps).await
}

/// Run the requested user steps with any fetcher.
pub async fn users_with<F: Fetch + ?Sized>(
    fetcher: &F,
    config: &Config,
    storage: &LocalStorage,
    steps: UserSteps,
) -> Result<()> {
    storage.ensure_root()?;

    if !steps.create_users_file && !steps.get_users_data {
        log::warn!("Nothing to do: pass --create-users-file and/or --get-users-data");
        return Ok(());
    }

    if steps.create_users_file {
        log::info!("Creating a file with unique users names");
        create_users_file(storage)?;
    }

    if steps.get_users_data {
        log::info!("Downloading users data");
        let crawler = UserCrawler::new(fetcher, &config.api.users_url, storage);
        crawler.fetch_all().await?;
    }

    Ok(())
}
