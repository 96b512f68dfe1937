//! Filesystem capabilities and persisted artifacts for the badpower watchdog.
//!
//! The watchdog owns two kinds of files under its log directory: a one-line
//! last-success timestamp per monitored target, and monthly log files that
//! are retired once they age past a year. Both are accessed through a
//! `Filesystem` trait so the whole cycle can run against an in-memory mock.

pub mod fsio;
pub mod retention;
pub mod stamp;
pub mod state;

pub use fsio::{FileEntry, Filesystem, FsError, MockFilesystem, RealFilesystem};
pub use retention::{find_expired_logs, log_file_name, LOG_MAX_AGE_DAYS};
pub use stamp::{format_stamp, parse_stamp, STAMP_FORMAT};
pub use state::{state_file_name, StateStore, FILE_PREFIX};
