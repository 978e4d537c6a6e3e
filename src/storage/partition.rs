//! Bounds-named partition files and the batch that produces them.
//!
//! A published partition is named
//! `{min_created_at_i}_{max_created_at_i}__{min_id}_{max_id}.data.csv`.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{Bounds, Item};
use crate::storage::csv_file::TempCsv;

/// Suffix shared by every published partition file.
pub const PARTITION_SUFFIX: &str = ".data.csv";

/// File name for a partition with the given bounds.
pub fn partition_file_name(bounds: &Bounds) -> String {
    format!(
        "{}_{}__{}_{}{}",
        bounds.min_created_at_i,
        bounds.max_created_at_i,
        bounds.min_id,
        bounds.max_id,
        PARTITION_SUFFIX
    )
}

/// Recover bounds from a partition file name.
///
/// Returns `None` for any other file, including `users.data.csv`.
pub fn parse_partition_name(name: &str) -> Option<Bounds> {
    let stem = name.strip_suffix(PARTITION_SUFFIX)?;
    let (instants, ids) = stem.split_once("__")?;
    let (min_created_at_i, max_created_at_i) = instants.split_once('_')?;
    let (min_id, max_id) = ids.split_once('_')?;

    Some(Bounds {
        min_created_at_i: min_created_at_i.parse().ok()?,
        max_created_at_i: max_created_at_i.parse().ok()?,
        min_id: min_id.parse().ok()?,
        max_id: max_id.parse().ok()?,
    })
}

/// A partition file found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPartition {
    pub path: PathBuf,
    pub bounds: Bounds,
}

/// Records accumulated across several fetch cycles, written through to a
/// temporary file until published.
pub struct Batch {
    csv: TempCsv,
    bounds: Option<Bounds>,
}

impl Batch {
    pub fn create(tmp_path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            csv: TempCsv::create(tmp_path, &Item::HEADER)?,
            bounds: None,
        })
    }

    /// Append one page of records, widening the batch bounds.
    pub fn append(&mut self, items: &[Item]) -> Result<()> {
        for item in items {
            self.csv.write_row(&item.to_record())?;
            self.bounds = Bounds::merge_into(self.bounds, item.bounds());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.csv.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.csv.rows() == 0
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Rename the batch to its bounds-derived name inside `dir`.
    ///
    /// An empty batch has no bounds; its temporary file is removed and
    /// nothing is published.
    pub fn publish(self, dir: &Path) -> Result<Option<PublishedPartition>> {
        let Some(bounds) = self.bounds else {
            self.csv.discard()?;
            return Ok(None);
        };

        let path = dir.join(partition_file_name(&bounds));
        self.csv.commit(&path)?;
        Ok(Some(PublishedPartition { path, bounds }))
    }

    pub fn discard(self) -> Result<()> {
        self.csv.discard()
    }
}
