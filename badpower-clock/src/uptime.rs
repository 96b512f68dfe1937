//! System uptime readings for the reboot guard.
//!
//! The watchdog refuses to fire its recovery command until the local machine
//! has been up for a configured number of minutes, so a recovery-induced
//! reboot cannot immediately re-trigger recovery. This module provides the
//! uptime reading behind a trait so the guard can be tested deterministically.

use std::fs;

/// Trait for reading how long the local system has been up.
pub trait UptimeSource: Send + Sync {
    /// Milliseconds since the local system booted.
    ///
    /// A source that cannot determine uptime reports 0, which keeps the
    /// reboot guard closed.
    fn uptime_ms(&self) -> u64;
}

/// Real uptime source backed by `/proc/uptime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUptime;

impl SystemUptime {
    /// Create a new system uptime source.
    pub fn new() -> Self {
        Self
    }
}

impl UptimeSource for SystemUptime {
    fn uptime_ms(&self) -> u64 {
        fs::read_to_string("/proc/uptime")
            .ok()
            .and_then(|content| parse_proc_uptime(&content))
            .unwrap_or(0)
    }
}

/// Parse `/proc/uptime` content into a millisecond tick count.
/// Extracted for testability.
///
/// The file holds two floating-point second counts; the first is seconds
/// since boot.
pub fn parse_proc_uptime(content: &str) -> Option<u64> {
    let seconds: f64 = content.split_whitespace().next()?.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds * 1000.0) as u64)
}

/// Mock uptime source with a fixed tick count.
#[derive(Debug, Clone, Copy)]
pub struct MockUptime {
    ms: u64,
}

impl MockUptime {
    /// Create a mock uptime source reporting a fixed millisecond count.
    pub fn new(ms: u64) -> Self {
        Self { ms }
    }

    /// Create a mock uptime source from whole minutes.
    pub fn from_minutes(minutes: u64) -> Self {
        Self { ms: minutes * 60_000 }
    }
}

impl UptimeSource for MockUptime {
    fn uptime_ms(&self) -> u64 {
        self.ms
    }
}
