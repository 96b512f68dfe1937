//! The per-target last-success record.
//!
//! One small file under the log directory holds the local timestamp of the
//! last run that saw the expected hardware address. It is written on success,
//! read on failure, and deleted when a triggered recovery should force a
//! fresh success before the watchdog re-arms.

use std::path::{Path, PathBuf};

use crate::fsio::{Filesystem, FsError};

/// Filename prefix shared by every file the watchdog owns.
pub const FILE_PREFIX: &str = "badpower_";

/// Name of the last-success file for a target identifier.
pub fn state_file_name(prefix: &str) -> String {
    format!("{FILE_PREFIX}{prefix}.txt")
}

/// Reader/writer for the one-line last-success file.
#[derive(Debug, Clone)]
pub struct StateStore<F: Filesystem> {
    fs: F,
    path: PathBuf,
}

impl<F: Filesystem> StateStore<F> {
    /// Create a store for the given target identifier under `dir`.
    pub fn new(fs: F, dir: &Path, prefix: &str) -> Self {
        let path = dir.join(state_file_name(prefix));
        Self { fs, path }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a record exists.
    pub fn exists(&self) -> bool {
        self.fs.exists(&self.path)
    }

    /// Read the stored stamp, trimmed to its first line.
    /// `Ok(None)` when no record exists.
    pub fn read_raw(&self) -> Result<Option<String>, FsError> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let contents = self.fs.read_to_string(&self.path)?;
        Ok(Some(
            contents.lines().next().unwrap_or("").trim().to_string(),
        ))
    }

    /// Overwrite the record with a new stamp.
    pub fn record(&self, stamp: &str) -> Result<(), FsError> {
        self.fs.write(&self.path, stamp)
    }

    /// Delete the record. Deleting a missing record is not an error.
    pub fn clear(&self) -> Result<(), FsError> {
        if self.fs.exists(&self.path) {
            self.fs.remove(&self.path)?;
        }
        Ok(())
    }
}
