// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod item;
mod user;
mod window;

// Re-export all public types
pub use config::{ApiConfig, Config, CrawlConfig, RateLimitConfig};
pub use item::{Item, ItemKind};
pub use user::User;
pub use window::{Bounds, EARLIEST_CREATED_AT_I, Window};

#[cfg(test)]
pub(crate) use item::tests::sample_item;
