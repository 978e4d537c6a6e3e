//! CSV output that only becomes visible once complete.
//!
//! Rows go to a temporary path; [`TempCsv::commit`] flushes, syncs and then
//! renames the file to its permanent name. Readers scanning the directory never
//! see a half-written file under a permanent name.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A CSV file being written under a temporary name.
pub struct TempCsv {
    tmp_path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl TempCsv {
    /// Create (or truncate) the temporary file and write the header row.
    pub fn create(tmp_path: impl Into<PathBuf>, header: &[&str]) -> Result<Self> {
        let tmp_path = tmp_path.into();
        if let Some(parent) = tmp_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&tmp_path)?;
        writer.write_record(header)?;
        Ok(Self {
            tmp_path,
            writer,
            rows: 0,
        })
    }

    pub fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.writer.write_record(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Finish writing and atomically move the file to `final_path`.
    pub fn commit(self, final_path: &Path) -> Result<()> {
        let file = self.writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, final_path)?;
        Ok(())
    }

    /// Drop the temporary file without publishing it.
    pub fn discard(self) -> Result<()> {
        let Self {
            tmp_path, writer, ..
        } = self;
        drop(writer);
        match fs::remove_file(&tmp_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_commit_moves_file_into_place() {
        let tmp = TempDir::new().unwrap();
        let tmp_path = tmp.path().join("out.csv.tmp");
        let final_path = tmp.path().join("out.csv");

        let mut csv = TempCsv::create(&tmp_path, &["a", "b"]).unwrap();
        csv.write_row(&["1".to_string(), "x,y".to_string()]).unwrap();
        assert_eq!(csv.rows(), 1);
        assert!(!final_path.exists());

        csv.commit(&final_path).unwrap();

        assert!(!tmp_path.exists());
        let content = fs::read_to_string(&final_path).unwrap();
        assert_eq!(content, "a,b\n1,\"x,y\"\n");
    }

    #[test]
    fn test_discard_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let tmp_path = tmp.path().join("out.csv.tmp");

        let csv = TempCsv::create(&tmp_path, &["a"]).unwrap();
        csv.discard().unwrap();

        assert!(!tmp_path.exists());
    }
}
