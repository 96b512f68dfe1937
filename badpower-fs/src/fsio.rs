//! Filesystem abstraction for the watchdog's state and log files.
//!
//! Provides a trait over the handful of operations the watchdog performs,
//! with a real implementation and an in-memory mock for tests. The mock
//! carries per-file modification times because log retention is defined over
//! them.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::UNIX_EPOCH;

use thiserror::Error;

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("path error: {0}")]
    Path(String),
}

/// A regular file observed in the log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Last-modified time as Unix seconds; 0 when unknown.
    pub modified_unix_sec: u64,
}

/// Trait for filesystem operations.
/// Abstracted for testing with mock implementations.
pub trait Filesystem: Send + Sync {
    /// Read a file's contents as a string.
    fn read_to_string(&self, path: &Path) -> Result<String, FsError>;

    /// Replace a file's contents.
    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError>;

    /// Append to a file, creating it (and missing parent directories) first.
    fn append(&self, path: &Path, contents: &str) -> Result<(), FsError>;

    /// Remove a file.
    fn remove(&self, path: &Path) -> Result<(), FsError>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and its parents if needed.
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;

    /// List the regular files directly inside a directory, sorted by path.
    /// A missing directory lists as empty.
    fn list_files(&self, dir: &Path) -> Result<Vec<FileEntry>, FsError>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        Ok(fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        fs::write(path, contents)?;
        Ok(())
    }

    fn append(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(contents.as_bytes())?;

        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(path)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<FileEntry>, FsError> {
        let mut files = Vec::new();

        if !dir.exists() {
            return Ok(files);
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let modified_unix_sec = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0);

            files.push(FileEntry {
                path,
                modified_unix_sec,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

/// Mock filesystem for testing.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    files: Arc<RwLock<HashMap<PathBuf, MockFile>>>,
    dirs: Arc<RwLock<HashSet<PathBuf>>>,
}

#[derive(Debug, Clone, Default)]
struct MockFile {
    contents: String,
    modified_unix_sec: u64,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file directly (for test setup). Modification time defaults to 0.
    pub fn add_file(&self, path: PathBuf, contents: &str) {
        self.files.write().unwrap().insert(
            path,
            MockFile {
                contents: contents.to_string(),
                modified_unix_sec: 0,
            },
        );
    }

    /// Add a file with an explicit modification time (for retention tests).
    pub fn add_file_with_mtime(&self, path: PathBuf, contents: &str, modified_unix_sec: u64) {
        self.files.write().unwrap().insert(
            path,
            MockFile {
                contents: contents.to_string(),
                modified_unix_sec,
            },
        );
    }

    /// Override a file's modification time.
    pub fn set_mtime(&self, path: &Path, modified_unix_sec: u64) {
        if let Some(file) = self.files.write().unwrap().get_mut(path) {
            file.modified_unix_sec = modified_unix_sec;
        }
    }

    /// Get content of a specific file.
    pub fn get_file(&self, path: &Path) -> Option<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|f| f.contents.clone())
    }

    /// Paths of all files currently in the mock, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.read().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Filesystem for MockFilesystem {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        match self.files.read().unwrap().get(path) {
            Some(file) => Ok(file.contents.clone()),
            None => Err(FsError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            ))),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        let mut files = self.files.write().unwrap();
        let entry = files.entry(path.to_path_buf()).or_default();
        entry.contents = contents.to_string();
        Ok(())
    }

    fn append(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        let mut files = self.files.write().unwrap();
        let entry = files.entry(path.to_path_buf()).or_default();
        entry.contents.push_str(contents);
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        self.files.write().unwrap().remove(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
            || self.dirs.read().unwrap().contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.dirs.write().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<FileEntry>, FsError> {
        let mut entries: Vec<FileEntry> = self
            .files
            .read()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, file)| FileEntry {
                path: path.clone(),
                modified_unix_sec: file.modified_unix_sec,
            })
            .collect();

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
