//! Run logging: every notable event goes to the console and a monthly file.
//!
//! There is no global logger. A `RunLog` is constructed once from validated
//! configuration and passed to every step of the cycle. Each recorded event
//! becomes one line, prefixed with a local timestamp, echoed to the console
//! and appended to `badpower_<prefix>_YYYYMM.log` under the log directory.
//! The month in the filename comes from the clock at write time, so a month
//! rollover starts a new file without any bookkeeping.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use badpower_clock::Clock;
use badpower_fs::{format_stamp, log_file_name, Filesystem, FsError};

/// Width of the separator line opening each run.
const SEPARATOR_WIDTH: usize = 60;

/// Trait for the console sink of log lines.
pub trait Console: Send + Sync {
    /// Emit one finished log line.
    fn print(&self, line: &str);
}

/// Console sink that writes to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&self, line: &str) {
        println!("{line}");
    }
}

/// Mock console for testing that captures all lines.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockConsole {
    lines: Arc<RwLock<Vec<String>>>,
}

impl MockConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().unwrap().clone()
    }

    /// Whether any captured line contains the given substring.
    pub fn contains(&self, substring: &str) -> bool {
        self.lines.read().unwrap().iter().any(|l| l.contains(substring))
    }
}

impl Console for MockConsole {
    fn print(&self, line: &str) {
        self.lines.write().unwrap().push(line.to_string());
    }
}

/// A console sink that discards all lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConsole;

impl Console for NullConsole {
    fn print(&self, _line: &str) {}
}

/// The per-run event log.
pub struct RunLog<'a, F: Filesystem, C: Clock, K: Console> {
    fs: &'a F,
    clock: &'a C,
    console: &'a K,
    dir: PathBuf,
    prefix: String,
}

impl<'a, F: Filesystem, C: Clock, K: Console> RunLog<'a, F, C, K> {
    /// Create the log for a target identifier under `dir`.
    pub fn new(fs: &'a F, clock: &'a C, console: &'a K, dir: &Path, prefix: &str) -> Self {
        Self {
            fs,
            clock,
            console,
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    /// Record one event: timestamped line to console and monthly file.
    pub fn record(&self, message: &str) -> Result<(), FsError> {
        let now = self.clock.now_unix_sec();
        let line = format!("{} - {}", format_stamp(now), message);

        self.console.print(&line);

        let file = self.dir.join(log_file_name(&self.prefix, now));
        self.fs.append(&file, &format!("{line}\n"))
    }

    /// Record the separator line that opens each run.
    pub fn separator(&self) -> Result<(), FsError> {
        self.record(&"-".repeat(SEPARATOR_WIDTH))
    }
}
