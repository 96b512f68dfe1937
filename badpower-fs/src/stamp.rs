//! Local-time timestamp formatting and parsing for the last-success record.
//!
//! The persisted stamp uses a fixed human-readable local-time format. Parsing
//! is explicit about failure: a malformed stamp yields `None` rather than a
//! degenerate epoch value, so the caller can treat corruption as "no prior
//! record" instead of "infinitely stale".

use chrono::{Local, NaiveDateTime, TimeZone};

/// Fixed format of the persisted last-success stamp and of log-line prefixes.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a Unix-second instant as a local-time stamp.
pub fn format_stamp(unix_sec: u64) -> String {
    Local
        .timestamp_opt(unix_sec as i64, 0)
        .single()
        .map(|dt| dt.format(STAMP_FORMAT).to_string())
        .unwrap_or_else(|| unix_sec.to_string())
}

/// Parse a local-time stamp back into Unix seconds.
///
/// Returns `None` for anything that does not match the fixed format, or for
/// wall times that do not exist locally (spring-forward gaps). An ambiguous
/// wall time (fall-back fold) resolves to its earlier occurrence.
pub fn parse_stamp(raw: &str) -> Option<u64> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), STAMP_FORMAT).ok()?;
    let local = Local.from_local_datetime(&naive).earliest()?;
    u64::try_from(local.timestamp()).ok()
}
