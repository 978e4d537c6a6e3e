//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Endpoints and HTTP client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Page and batch sizing for the item crawl
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Outbound request budget shared by every fetch
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        Url::parse(&self.api.search_url)
            .map_err(|e| AppError::validation(format!("api.search_url: {e}")))?;
        Url::parse(&self.api.users_url)
            .map_err(|e| AppError::validation(format!("api.users_url: {e}")))?;
        if self.crawl.hits_per_page == 0 {
            return Err(AppError::validation("crawl.hits_per_page must be > 0"));
        }
        if self.crawl.requests_per_file == 0 {
            return Err(AppError::validation("crawl.requests_per_file must be > 0"));
        }
        if self.rate_limit.max_calls == 0 {
            return Err(AppError::validation("rate_limit.max_calls must be > 0"));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(AppError::validation("rate_limit.window_secs must be > 0"));
        }
        Ok(())
    }
}

/// Endpoints and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Date-ordered search endpoint
    #[serde(default = "defaults::search_url")]
    pub search_url: String,

    /// Per-user detail endpoint; the username is appended as a path segment
    #[serde(default = "defaults::users_url")]
    pub users_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            search_url: defaults::search_url(),
            users_url: defaults::users_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Page and batch sizing for the item crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Hits requested per search call (the API caps this at 1000)
    #[serde(default = "defaults::hits_per_page")]
    pub hits_per_page: usize,

    /// Search calls accumulated into one published file
    #[serde(default = "defaults::requests_per_file")]
    pub requests_per_file: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            hits_per_page: defaults::hits_per_page(),
            requests_per_file: defaults::requests_per_file(),
        }
    }
}

/// Outbound request budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum calls allowed inside one rolling window
    #[serde(default = "defaults::max_calls")]
    pub max_calls: usize,

    /// Rolling window length in seconds
    #[serde(default = "defaults::window_secs")]
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: defaults::max_calls(),
            window_secs: defaults::window_secs(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn search_url() -> String {
        "http://hn.algolia.com/api/v1/search_by_date".into()
    }
    pub fn users_url() -> String {
        "https://hn.algolia.com/api/v1/users".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; hn-harvest/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Crawl defaults
    pub fn hits_per_page() -> usize {
        1000
    }
    pub fn requests_per_file() -> usize {
        1000
    }

    // Algolia blocks above 10k requests per hour; stay under it.
    pub fn max_calls() -> usize {
        9_000
    }
    pub fn window_secs() -> u64 {
        3600
    }
}
