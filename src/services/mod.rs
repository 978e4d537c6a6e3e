//! Service layer for the harvester.
//!
//! This module contains the business logic for:
//! - Response decoding (`parse_search_page`, `parse_user`)
//! - The windowed item crawl (`ItemCrawler`)
//! - User key derivation and detail fetching (`UserCrawler`)

pub mod items;
pub mod parse;
pub mod users;

pub use items::{CrawlOutcome, CrowdedSecond, Cursor, ItemCrawler};
pub use parse::{SearchPage, parse_search_page, parse_user};
pub use users::{UserCrawler, create_users_file, derive_user_keys, read_authors};
