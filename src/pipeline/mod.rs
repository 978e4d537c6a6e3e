//! Pipeline entry points for harvester operations.
//!
//! - `run_crawler`: Walk the search endpoint into published item partitions
//! - `run_users`: Derive the author key set and fetch user details

pub mod crawl;
pub mod rate_limiter;
pub mod users;

pub use crawl::{
    CrawlOptions, crawl_with, rate_limited, resolve_window, run_crawler, run_crawler_through,
};
pub use rate_limiter::{RateLimited, RateLimiter, RateLimiterConfig};
pub use users::{UserSteps, run_users, run_users_through, users_with};
