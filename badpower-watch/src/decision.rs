//! Decision rules for firing the recovery command.
//!
//! Pure arithmetic, kept free of I/O: elapsed time since the last recorded
//! success, system uptime in whole minutes, and the inclusive two-threshold
//! predicate. The uptime guard exists so a recovery-induced reboot cannot
//! immediately re-trigger recovery before the monitored condition could have
//! cleared.

/// Minutes elapsed between two Unix-second instants, as a float.
pub fn elapsed_minutes(now_unix_sec: u64, then_unix_sec: u64) -> f64 {
    (now_unix_sec as f64 - then_unix_sec as f64) / 60.0
}

/// Whole minutes of uptime from a millisecond tick count, fraction truncated.
pub fn uptime_minutes(uptime_ms: u64) -> u64 {
    uptime_ms / 60_000
}

/// Whether both thresholds are met. Comparisons are inclusive.
pub fn should_trigger(
    elapsed_min: f64,
    uptime_min: u64,
    wait_threshold_min: u64,
    uptime_threshold_min: u64,
) -> bool {
    elapsed_min >= wait_threshold_min as f64 && uptime_min >= uptime_threshold_min
}

/// Log line describing the wait-threshold comparison.
pub fn wait_comparison_line(elapsed_min: f64, wait_threshold_min: u64) -> String {
    let relation = if elapsed_min >= wait_threshold_min as f64 {
        ">="
    } else {
        "<"
    };
    format!(
        "Time since last success ({}) {} wait_min ({})",
        elapsed_min as i64, relation, wait_threshold_min
    )
}

/// Log line describing the uptime-threshold comparison.
pub fn uptime_comparison_line(uptime_min: u64, uptime_threshold_min: u64) -> String {
    let relation = if uptime_min >= uptime_threshold_min {
        ">="
    } else {
        "<"
    };
    format!(
        "System uptime ({}) {} uptime_min ({})",
        uptime_min, relation, uptime_threshold_min
    )
}
