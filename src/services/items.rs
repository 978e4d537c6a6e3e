// src/services/items.rs

//! Windowed item crawler.
//!
//! The search API only offers `created_at_i` as a cursor and returns hits
//! newest first. Each request asks for the window `[lower, upper]`; after a
//! page arrives, `upper` moves down to the oldest instant seen on that page.
//! The bound is inclusive, so records sharing that instant are fetched again
//! and can appear in two adjacent partitions. Nothing is ever skipped.

use url::Url;

use crate::error::Result;
use crate::models::{Config, Window};
use crate::services::parse::{SearchPage, parse_search_page};
use crate::storage::{Batch, LocalStorage, PublishedPartition};
use crate::utils::http::Fetch;
use crate::utils::search_url;

/// Summary of a crawl run.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub partitions: Vec<PublishedPartition>,
    pub requests: usize,
    pub records: usize,
    /// Upper bound the next request would have used
    pub final_upper: i64,
    /// Seconds the cursor had to step past before reading all of them
    pub crowded: Vec<CrowdedSecond>,
}

/// A second holding more records than one page could return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrowdedSecond {
    pub created_at_i: i64,
    /// Records at this instant that were fetched
    pub fetched: usize,
    /// Upper limit on records at this instant that were never fetched: the
    /// rest of the window as reported by the server
    pub may_be_missed: u64,
}

/// Position of the crawl inside its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub lower: i64,
    pub upper: i64,
    pub exhausted: bool,
    /// Set by the last [`Cursor::advance`] that had to step past a second
    pub crowded: Option<CrowdedSecond>,
}

impl Cursor {
    pub fn new(window: Window) -> Self {
        Self {
            lower: window.lower,
            upper: window.upper,
            exhausted: window.is_empty(),
            crowded: None,
        }
    }

    /// Move the cursor past `page`. Returns whether the page's records belong
    /// in the output.
    pub fn advance(&mut self, page: &SearchPage) -> bool {
        self.crowded = None;
        let bounds = match page.bounds {
            Some(bounds) if page.hits_count > 0 => bounds,
            _ => {
                self.exhausted = true;
                return false;
            }
        };

        // Everything left in the window came back on this page.
        if page.drains_window() {
            self.exhausted = true;
            return true;
        }

        if bounds.min_created_at_i < self.upper {
            self.upper = bounds.min_created_at_i;
        } else {
            let fetched = page
                .items
                .iter()
                .filter(|item| item.created_at_i == self.upper)
                .count();
            let may_be_missed = page.hits_count.saturating_sub(page.items.len() as u64);
            log::warn!(
                "More than one page of records at created_at_i={}; stepping past it, up to {} records may be missed",
                self.upper,
                may_be_missed
            );
            self.crowded = Some(CrowdedSecond {
                created_at_i: self.upper,
                fetched,
                may_be_missed,
            });
            self.upper -= 1;
        }

        if self.upper < self.lower {
            self.exhausted = true;
        }
        true
    }
}

/// Service walking the search endpoint backward through time.
pub struct ItemCrawler<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    config: &'a Config,
    storage: &'a LocalStorage,
}

impl<'a, F: Fetch + ?Sized> ItemCrawler<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a Config, storage: &'a LocalStorage) -> Self {
        Self {
            fetcher,
            config,
            storage,
        }
    }

    /// Crawl `window` into published partitions until the API runs dry.
    pub async fn run(&self, window: Window) -> Result<CrawlOutcome> {
        let mut cursor = Cursor::new(window);
        let mut outcome = CrawlOutcome::default();

        while !cursor.exhausted {
            let mut batch = self.storage.open_batch()?;

            if let Err(error) = self.fill_batch(&mut batch, &mut cursor, &mut outcome).await {
                if let Err(discard_error) = batch.discard() {
                    log::warn!("Failed to remove unpublished batch: {}", discard_error);
                }
                return Err(error);
            }

            match self.storage.publish(batch)? {
                Some(partition) => {
                    log::info!("Written data to a new file: {}", partition.path.display());
                    outcome.partitions.push(partition);
                }
                None => log::info!("Last batch was empty, nothing to publish"),
            }
        }

        outcome.final_upper = cursor.upper;
        Ok(outcome)
    }

    async fn fill_batch(
        &self,
        batch: &mut Batch,
        cursor: &mut Cursor,
        outcome: &mut CrawlOutcome,
    ) -> Result<()> {
        for _ in 0..self.config.crawl.requests_per_file {
            let page = self.fetch_page(cursor).await?;
            outcome.requests += 1;
            log::info!(
                "got {} entries for created_at_i in [{}, {}]",
                page.items.len(),
                cursor.lower,
                cursor.upper
            );

            if cursor.advance(&page) {
                batch.append(&page.items)?;
                outcome.records += page.items.len();
            }
            if let Some(crowded) = cursor.crowded {
                outcome.crowded.push(crowded);
            }
            if cursor.exhausted {
                break;
            }
        }
        Ok(())
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<SearchPage> {
        let url: Url = search_url(
            &self.config.api.search_url,
            self.config.crawl.hits_per_page,
            cursor.lower,
            cursor.upper,
        )?;
        let body = self.fetcher.fetch(&url).await?;
        parse_search_page(&body)
    }
}
