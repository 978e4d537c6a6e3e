// src/lib.rs

//! hn-harvest: Hacker News item and user harvester

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
