//! Rolling-window rate limiter.
//!
//! Allows at most `max_calls` calls to start inside any window of
//! `window` length. Before each call the limiter looks at the start time of
//! the call made `max_calls` calls ago; if that call is still inside the
//! window, it sleeps until it leaves it.
//!
//! The limiter never fails, it only delays. The sleep is not cancellable.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

use crate::error::Result;
use crate::models::RateLimitConfig;
use crate::utils::http::Fetch;

/// Call budget for the rate limiter.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiterConfig {
    /// Maximum calls allowed inside one window. Must be > 0.
    pub max_calls: usize,
    /// Rolling window length.
    pub window: Duration,
}

impl From<&RateLimitConfig> for RateLimiterConfig {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_calls: config.max_calls.max(1),
            window: config.window(),
        }
    }
}

/// Stateful gate owned by one run.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    /// Start times of the most recent calls, oldest first.
    calls: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self::with_config(RateLimiterConfig { max_calls, window })
    }

    pub fn with_config(mut config: RateLimiterConfig) -> Self {
        config.max_calls = config.max_calls.max(1);
        log::info!(
            "Rate limit: {} calls per {}s",
            config.max_calls,
            config.window.as_secs_f64()
        );
        Self {
            calls: VecDeque::with_capacity(config.max_calls),
            config,
        }
    }

    /// How long the next call has to wait, measured from `now`.
    pub fn delay_at(&self, now: Instant) -> Duration {
        if self.calls.len() < self.config.max_calls {
            return Duration::ZERO;
        }
        // Only the last `max_calls` entries are kept, so the front is the call
        // made `max_calls` calls ago.
        match self.calls.front() {
            Some(&oldest) => (oldest + self.config.window).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Wait until a call is allowed, then record it.
    pub async fn acquire(&mut self) {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            log::info!("Rate limit reached, sleeping for {}s", delay.as_secs());
            tokio::time::sleep(delay).await;
        }

        self.calls.push_back(Instant::now());
        while self.calls.len() > self.config.max_calls {
            self.calls.pop_front();
        }
    }

    /// Run `op` once the gate allows it, returning its output unchanged.
    pub async fn run<F, Fut, T>(&mut self, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.acquire().await;
        op().await
    }
}

/// [`Fetch`] decorator that passes every request through a [`RateLimiter`].
pub struct RateLimited<F> {
    inner: F,
    limiter: Mutex<RateLimiter>,
}

impl<F: Fetch> RateLimited<F> {
    pub fn new(inner: F, limiter: RateLimiter) -> Self {
        Self {
            inner,
            limiter: Mutex::new(limiter),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: Fetch> Fetch for RateLimited<F> {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.limiter.lock().await.acquire().await;
        self.inner.fetch(url).await
    }
}
