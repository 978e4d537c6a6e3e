// src/pipeline/crawl.rs

//! Item crawling pipeline.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, EARLIEST_CREATED_AT_I, Window};
use crate::pipeline::rate_limiter::{RateLimited, RateLimiter, RateLimiterConfig};
use crate::services::{CrawlOutcome, ItemCrawler};
use crate::storage::LocalStorage;
use crate::utils::http::{Fetch, HttpFetcher};

/// Caller overrides for the crawl window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlOptions {
    pub min_created_at_i: Option<i64>,
    pub max_created_at_i: Option<i64>,
    /// Continue below the oldest published partition
    pub resume: bool,
    /// Only fetch records newer than the newest published partition
    pub incremental: bool,
}

/// Work out the window for this run. Explicit bounds win over
/// `resume`/`incremental`, which win over the defaults.
pub fn resolve_window(storage: &LocalStorage, options: &CrawlOptions) -> Result<Window> {
    let default = Window::full();

    let upper = match options.max_created_at_i {
        Some(upper) => upper,
        None if options.resume => match storage.oldest_published_instant()? {
            Some(oldest) => {
                log::info!("Resuming below published data at created_at_i={}", oldest);
                oldest
            }
            None => default.upper,
        },
        None => default.upper,
    };

    let lower = match options.min_created_at_i {
        Some(lower) => lower,
        None if options.incremental => match storage.newest_published_instant()? {
            Some(newest) => {
                log::info!("Fetching records newer than created_at_i={}", newest);
                newest
            }
            None => EARLIEST_CREATED_AT_I,
        },
        None => EARLIEST_CREATED_AT_I,
    };

    Ok(Window::new(lower, upper))
}

/// Wrap `inner` in the configured rate limit.
pub fn rate_limited<F: Fetch>(inner: F, config: &Config) -> RateLimited<F> {
    let limiter = RateLimiter::with_config(RateLimiterConfig::from(&config.rate_limit));
    RateLimited::new(inner, limiter)
}

/// Run the item crawler against the live API.
pub async fn run_crawler(
    config: &Config,
    storage: &LocalStorage,
    options: &CrawlOptions,
) -> Result<CrawlOutcome> {
    let http = HttpFetcher::from_config(&config.api)?;
    run_crawler_through(http, config, storage, options).await
}

/// Run the item crawler with every request going through `inner` under the
/// configured rate limit.
pub async fn run_crawler_through<F: Fetch>(
    inner: F,
    config: &Config,
    storage: &LocalStorage,
    options: &CrawlOptions,
) -> Result<CrawlOutcome> {
    let fetcher = rate_limited(inner, config);
    crawl_with(&fetcher, config, storage, options).await
}

/// Run the item crawler with any fetcher.
pub async fn crawl_with<F: Fetch + ?Sized>(
    fetcher: &F,
    config: &Config,
    storage: &LocalStorage,
    options: &CrawlOptions,
) -> Result<CrawlOutcome> {
    let start_time = Utc::now();
    storage.ensure_root()?;

    let window = resolve_window(storage, options)?;
    log::info!(
        "Crawling created_at_i in [{}, {}] into {}",
        window.lower,
        window.upper,
        storage.root().display()
    );

    let crawler = ItemCrawler::new(fetcher, config, storage);
    let outcome = crawler.run(window).await?;

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Crawl complete: {} files, {} records, {} requests in {}s",
        outcome.partitions.len(),
        outcome.records,
        outcome.requests,
        elapsed.num_seconds()
    );
    if !outcome.crowded.is_empty() {
        let may_be_missed: u64 = outcome.crowded.iter().map(|c| c.may_be_missed).sum();
        log::warn!(
            "{} crowded seconds were stepped past; up to {} records may be missing",
            outcome.crowded.len(),
            may_be_missed
        );
        for crowded in &outcome.crowded {
            log::warn!(
                "  created_at_i={}: fetched {}, up to {} missed",
                crowded.created_at_i,
                crowded.fetched,
                crowded.may_be_missed
            );
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_item;
    use tempfile::TempDir;

    fn storage_with(instants: &[(i64, i64)]) -> (TempDir, LocalStorage) {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        for (i, &(oldest, newest)) in instants.iter().enumerate() {
            let mut batch = storage.open_batch().unwrap();
            batch
                .append(&[
                    sample_item(newest, 2 * i as u64 + 1, "a"),
                    sample_item(oldest, 2 * i as u64, "b"),
                ])
                .unwrap();
            storage.publish(batch).unwrap();
        }
        (tmp, storage)
    }

    #[test]
    fn test_defaults_cover_whole_dataset() {
        let (_tmp, storage) = storage_with(&[]);
        let window = resolve_window(&storage, &CrawlOptions::default()).unwrap();
        assert_eq!(window.lower, EARLIEST_CREATED_AT_I);
        assert!(window.upper > Utc::now().timestamp());
    }

    #[test]
    fn test_resume_starts_at_oldest_partition() {
        let (_tmp, storage) = storage_with(&[(500, 900), (200, 480)]);
        let options = CrawlOptions {
            resume: true,
            ..CrawlOptions::default()
        };
        let window = resolve_window(&storage, &options).unwrap();
        assert_eq!(window.upper, 200);
        assert_eq!(window.lower, EARLIEST_CREATED_AT_I);
    }

    #[test]
    fn test_incremental_starts_at_newest_partition() {
        let (_tmp, storage) = storage_with(&[(500, 900), (200, 480)]);
        let options = CrawlOptions {
            incremental: true,
            ..CrawlOptions::default()
        };
        let window = resolve_window(&storage, &options).unwrap();
        assert_eq!(window.lower, 900);
    }

    #[test]
    fn test_explicit_bounds_win() {
        let (_tmp, storage) = storage_with(&[(500, 900)]);
        let options = CrawlOptions {
            min_created_at_i: Some(10),
            max_created_at_i: Some(20),
            resume: true,
            incremental: true,
        };
        assert_eq!(
            resolve_window(&storage, &options).unwrap(),
            Window::new(10, 20)
        );
    }
}
