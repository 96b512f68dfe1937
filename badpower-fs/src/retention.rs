//! Log retention for the watchdog's monthly files.
//!
//! Log lines append to one file per calendar month per target identifier.
//! At the start of each run, files belonging to the watchdog whose
//! modification age exceeds a year are retired. Expiry is reported to the
//! caller rather than acted on here, because each deletion must be logged
//! before the file is removed.

use std::path::Path;

use badpower_clock::Clock;
use chrono::{Local, TimeZone};

use crate::fsio::{FileEntry, Filesystem, FsError};
use crate::state::FILE_PREFIX;

/// Maximum age of a log file before it is retired.
pub const LOG_MAX_AGE_DAYS: u64 = 365;

const SECS_PER_DAY: u64 = 86_400;

/// Name of the monthly log file for a target identifier at a given instant.
/// The month comes from local time, so a month rollover starts a new file.
pub fn log_file_name(prefix: &str, unix_sec: u64) -> String {
    Local
        .timestamp_opt(unix_sec as i64, 0)
        .single()
        .map(|dt| format!("{FILE_PREFIX}{prefix}_{}.log", dt.format("%Y%m")))
        .unwrap_or_else(|| format!("{FILE_PREFIX}{prefix}_{unix_sec}.log"))
}

/// Find the watchdog-owned files in `dir` whose modification age exceeds
/// [`LOG_MAX_AGE_DAYS`], sorted by path.
///
/// Only filenames starting with the watchdog prefix are considered; other
/// files in a shared directory are never candidates.
pub fn find_expired_logs<F: Filesystem, C: Clock>(
    fs: &F,
    dir: &Path,
    clock: &C,
) -> Result<Vec<FileEntry>, FsError> {
    let now = clock.now_unix_sec();
    let max_age_secs = LOG_MAX_AGE_DAYS * SECS_PER_DAY;

    let expired = fs
        .list_files(dir)?
        .into_iter()
        .filter(|entry| {
            entry
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |name| name.starts_with(FILE_PREFIX))
        })
        .filter(|entry| now.saturating_sub(entry.modified_unix_sec) > max_age_secs)
        .collect();

    Ok(expired)
}
