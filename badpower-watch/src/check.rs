//! The check-and-decide cycle.
//!
//! One linear pass per invocation: retire year-old log files, probe the
//! target, compare against the persisted last-success stamp, and either
//! record a fresh success or weigh the two thresholds and fire the recovery
//! command. Every effectful dependency is injected, so the whole cycle runs
//! deterministically under test.

use badpower_clock::{Clock, UptimeSource};
use badpower_fs::{find_expired_logs, format_stamp, parse_stamp, Filesystem, FsError, StateStore};
use thiserror::Error;

use crate::cli::WatchConfig;
use crate::decision::{
    elapsed_minutes, should_trigger, uptime_comparison_line, uptime_minutes, wait_comparison_line,
};
use crate::logger::{Console, RunLog};
use crate::probe::{run_probe, CommandRunner};

/// Errors from the check cycle.
///
/// Probe-command failures never surface here; absence of the expected
/// output is simply a failed probe. Only filesystem trouble after
/// validation aborts a run.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("filesystem error: {0}")]
    Filesystem(#[from] FsError),
}

/// How a check cycle concluded. Every variant exits 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The expected hardware address answered; the stamp was updated.
    SuccessRecorded,
    /// Probe failed, but there is no prior success to compare against.
    NoPriorRecord,
    /// Probe failed and the stored stamp could not be parsed; treated the
    /// same as having no prior record.
    MalformedState,
    /// Probe failed and the stamp is readable, but the thresholds are not
    /// both met.
    BelowThreshold,
    /// Both thresholds met; the recovery command was fired.
    Triggered,
}

/// Execute one check cycle against validated configuration.
///
/// `warnings` carries the parser's non-fatal observations so the lenient
/// flag handling is visible in the monthly log, not only on the console.
pub fn execute_check<R, C, U, F, K>(
    config: &WatchConfig,
    runner: &R,
    clock: &C,
    uptime: &U,
    fs: &F,
    console: &K,
    warnings: &[String],
) -> Result<CheckOutcome, CheckError>
where
    R: CommandRunner,
    C: Clock,
    U: UptimeSource,
    F: Filesystem + Clone,
    K: Console,
{
    fs.create_dir_all(&config.log_dir)?;
    let log = RunLog::new(fs, clock, console, &config.log_dir, &config.prefix);

    // Retire year-old files before this run appends anything.
    for entry in find_expired_logs(fs, &config.log_dir, clock)? {
        log.record(&format!("Deleting old log file: {}", entry.path.display()))?;
        fs.remove(&entry.path)?;
    }

    log.separator()?;
    log.record(&format!(
        "Starting check for IP: {}, MAC: {}",
        config.ip, config.mac
    ))?;
    for warning in warnings {
        log.record(&format!("Warning: {warning}"))?;
    }

    let state = StateStore::new(fs.clone(), &config.log_dir, &config.prefix);

    if run_probe(runner, &config.ip, &config.mac) {
        state.record(&format_stamp(clock.now_unix_sec()))?;
        log.record("MAC address found. Timestamp updated.")?;
        return Ok(CheckOutcome::SuccessRecorded);
    }

    let raw = match state.read_raw()? {
        Some(raw) => raw,
        None => {
            log.record("MAC not found. No timestamp file. Exiting.")?;
            return Ok(CheckOutcome::NoPriorRecord);
        }
    };

    log.record(&format!("Last success timestamp read: {raw}"))?;

    let last = match parse_stamp(&raw) {
        Some(last) => last,
        None => {
            log.record("Stored timestamp is malformed; treating it as no prior record.")?;
            return Ok(CheckOutcome::MalformedState);
        }
    };

    let elapsed = elapsed_minutes(clock.now_unix_sec(), last);
    let up_min = uptime_minutes(uptime.uptime_ms());

    log.record(&format!(
        "MAC not found. Time since last success: {elapsed:.1} min, Uptime: {up_min} min."
    ))?;
    log.record(&wait_comparison_line(elapsed, config.wait_min))?;
    log.record(&uptime_comparison_line(up_min, config.uptime_min))?;

    if should_trigger(elapsed, up_min, config.wait_min, config.uptime_min) {
        log.record(&format!("Conditions met. Executing command: {}", config.exec))?;
        if config.clear {
            state.clear()?;
            log.record("Timestamp file cleared; a fresh success is required to re-arm.")?;
        }
        // Fire-and-forget: completion awaited, exit status not inspected.
        let _ = runner.run(&config.exec);
        Ok(CheckOutcome::Triggered)
    } else {
        log.record("Conditions NOT met. No action taken.")?;
        Ok(CheckOutcome::BelowThreshold)
    }
}
