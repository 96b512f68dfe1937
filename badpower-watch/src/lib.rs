//! badpower watchdog.
//!
//! A single-shot host-liveness check: force a fresh link-layer resolution of
//! a target address, record when the expected hardware address last answered,
//! and fire a recovery command once the silence outlasts a threshold while
//! system uptime clears the reboot guard. Meant to be invoked repeatedly by
//! an external scheduler.

pub mod check;
pub mod cli;
pub mod decision;
pub mod exit;
pub mod logger;
pub mod probe;

pub use check::{execute_check, CheckError, CheckOutcome};
pub use cli::{scan_tokens, usage, validate, CliError, RawArgs, WatchConfig};
pub use logger::{Console, MockConsole, NullConsole, RunLog, StdoutConsole};
pub use probe::{run_probe, CommandError, CommandOutput, CommandRunner, MockCommandRunner, ShellRunner};
