//! Local data directory.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── {minT}_{maxT}__{minId}_{maxId}.data.csv   # Published item partitions
//! ├── batch.csv.tmp                             # Batch being written
//! ├── users                                     # Sorted author key set
//! ├── users.data.csv                            # User details
//! └── users.data.csv.tmp                        # User details being written
//! ```
//!
//! Every permanent file is produced by writing a temporary file and renaming
//! it into place.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{AppError, Result};
use crate::models::Item;
use crate::storage::cell::Columns;
use crate::storage::partition::{
    Batch, PARTITION_SUFFIX, PublishedPartition, parse_partition_name,
};

/// Temporary file used by every batch of a crawl run.
pub const BATCH_TMP_FILE: &str = "batch.csv.tmp";

/// Sorted, deduplicated author names.
pub const USERS_FILE: &str = "users";

/// User detail records.
pub const USERS_DATA_FILE: &str = "users.data.csv";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Create the root directory if it is missing.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root_dir)?;
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    pub fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path(&format!("{key}.tmp"));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    pub fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Replace `key` with one line per entry.
    pub fn write_lines<I, S>(&self, key: &str, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        self.write_bytes(key, content.as_bytes())
    }

    /// Non-empty lines of `key`; a missing file is an error.
    pub fn read_lines(&self, key: &str) -> Result<Vec<String>> {
        let bytes = self.read_bytes(key)?.ok_or_else(|| {
            AppError::config(format!("{} not found", self.path(key).display()))
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|e| AppError::decode(key, format!("not valid UTF-8: {e}")))?;
        Ok(text
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Start a batch on the shared temporary file.
    pub fn open_batch(&self) -> Result<Batch> {
        Batch::create(self.path(BATCH_TMP_FILE))
    }

    /// Publish a batch into the root directory.
    pub fn publish(&self, batch: Batch) -> Result<Option<PublishedPartition>> {
        batch.publish(&self.root_dir)
    }

    /// All published partitions, sorted by file name.
    pub fn published_partitions(&self) -> Result<Vec<PublishedPartition>> {
        let mut partitions = Vec::new();
        let entries = match fs::read_dir(&self.root_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(partitions),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.ends_with(PARTITION_SUFFIX) {
                continue;
            }
            match parse_partition_name(name) {
                Some(bounds) => partitions.push(PublishedPartition {
                    path: entry.path(),
                    bounds,
                }),
                None => log::debug!("Skipping non-partition file {}", name),
            }
        }

        partitions.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(partitions)
    }

    /// Oldest instant reached by any published partition.
    ///
    /// A crawl walks backward in time, so this is where an interrupted run
    /// resumes.
    pub fn oldest_published_instant(&self) -> Result<Option<i64>> {
        Ok(self
            .published_partitions()?
            .iter()
            .map(|p| p.bounds.min_created_at_i)
            .min())
    }

    /// Newest instant covered by any published partition.
    pub fn newest_published_instant(&self) -> Result<Option<i64>> {
        Ok(self
            .published_partitions()?
            .iter()
            .map(|p| p.bounds.max_created_at_i)
            .max())
    }

    /// Read every record of one partition file.
    pub fn read_items(&self, path: &Path) -> Result<Vec<Item>> {
        let mut reader = csv::Reader::from_path(path)?;
        let columns = Columns::new(reader.headers()?);

        let mut items = Vec::new();
        for record in reader.records() {
            items.push(Item::from_record(&columns, &record?)?);
        }
        Ok(items)
    }

    /// Load the whole corpus keyed by object id.
    ///
    /// Partitions are applied oldest-written first (modification time, then
    /// name), so when an id appears in several files the most recently written
    /// file wins.
    pub fn load_items(&self) -> Result<BTreeMap<u64, Item>> {
        let mut partitions = Vec::new();
        for partition in self.published_partitions()? {
            let modified = fs::metadata(&partition.path)?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);
            partitions.push((modified, partition.path));
        }
        partitions.sort();

        let mut corpus = BTreeMap::new();
        for (_, path) in partitions {
            for item in self.read_items(&path)? {
                corpus.insert(item.object_id, item);
            }
        }
        Ok(corpus)
    }
}
