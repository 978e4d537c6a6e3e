//! Storage for harvested data.
//!
//! Item partitions are immutable once published: each batch is written to a
//! temporary file and renamed to a name encoding its creation-time and id
//! bounds. Downstream consumers that see the same `object_id` in more than one
//! partition keep the copy from the most recently written file
//! ([`LocalStorage::load_items`]).

pub mod cell;
pub mod csv_file;
pub mod local;
pub mod partition;

// Re-export for convenience
pub use csv_file::TempCsv;
pub use local::{BATCH_TMP_FILE, LocalStorage, USERS_DATA_FILE, USERS_FILE};
pub use partition::{
    Batch, PARTITION_SUFFIX, PublishedPartition, parse_partition_name, partition_file_name,
};
