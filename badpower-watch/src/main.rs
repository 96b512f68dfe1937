//! badpower CLI binary.
//!
//! Entry point for the `badpower` watchdog. Parse and validate the
//! arguments, wire the real capabilities, run one check cycle.

use std::process::ExitCode;

use badpower_clock::{SystemClock, SystemUptime};
use badpower_fs::RealFilesystem;
use badpower_watch::exit::{codes, exit_code};
use badpower_watch::{execute_check, scan_tokens, usage, validate, ShellRunner, StdoutConsole};

fn main() -> ExitCode {
    let tokens: Vec<String> = std::env::args().skip(1).collect();

    let raw = scan_tokens(&tokens);
    if raw.help {
        print!("{}", usage());
        return ExitCode::from(codes::SUCCESS as u8);
    }

    let config = match validate(&raw) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(codes::INVALID_ARGS as u8);
        }
    };

    let runner = ShellRunner::new();
    let clock = SystemClock;
    let uptime = SystemUptime::new();
    let fs = RealFilesystem;
    let console = StdoutConsole;

    match execute_check(&config, &runner, &clock, &uptime, &fs, &console, &raw.warnings) {
        Ok(_outcome) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}
