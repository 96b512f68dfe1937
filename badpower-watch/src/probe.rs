//! Link-layer probing through external commands.
//!
//! The probe forces a fresh resolution of the target address: drop any cached
//! mapping, send one echo request to provoke resolution traffic, then read
//! the mapping table filtered to the target. The watchdog never parses the
//! table structurally; it only checks whether the expected hardware address
//! occurs in the captured text. Every process invocation goes through the
//! `CommandRunner` trait so tests can substitute deterministic fakes.

use std::collections::HashMap;
use std::io;
use std::process::Command;
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors from running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Captured result of a completed external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Whether the command reported success.
    pub success: bool,
}

/// Trait for running a shell command to completion and capturing its output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> Result<CommandOutput, CommandError>;
}

/// Real runner that spawns through the platform shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a new shell runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, CommandError> {
        let output = if cfg!(windows) {
            Command::new("cmd").arg("/C").arg(command).output()
        } else {
            Command::new("sh").arg("-c").arg(command).output()
        };

        let output = output.map_err(|source| CommandError::Spawn {
            command: command.to_string(),
            source,
        })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            success: output.status.success(),
        })
    }
}

/// Mock runner for testing.
///
/// Records every invocation and serves canned stdout per exact command
/// string; commands without a canned entry complete successfully with empty
/// output. Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockCommandRunner {
    outputs: Arc<RwLock<HashMap<String, String>>>,
    failures: Arc<RwLock<Vec<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `stdout` for an exact command string.
    pub fn set_output(&self, command: &str, stdout: &str) {
        self.outputs
            .write()
            .unwrap()
            .insert(command.to_string(), stdout.to_string());
    }

    /// Make an exact command string fail to spawn.
    pub fn fail_on(&self, command: &str) {
        self.failures.write().unwrap().push(command.to_string());
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// How many times an exact command string was run.
    pub fn call_count(&self, command: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == command)
            .count()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, CommandError> {
        self.calls.write().unwrap().push(command.to_string());

        if self.failures.read().unwrap().iter().any(|c| c == command) {
            return Err(CommandError::Spawn {
                command: command.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock spawn failure"),
            });
        }

        let stdout = self
            .outputs
            .read()
            .unwrap()
            .get(command)
            .cloned()
            .unwrap_or_default();

        Ok(CommandOutput {
            stdout,
            success: true,
        })
    }
}

/// Command that drops any cached mapping for the target address.
pub fn invalidate_command(ip: &str) -> String {
    format!("arp -d {ip}")
}

/// Command that sends exactly one echo request to the target.
pub fn echo_command(ip: &str) -> String {
    if cfg!(windows) {
        format!("ping -n 1 {ip}")
    } else {
        format!("ping -c 1 {ip}")
    }
}

/// Command that queries the mapping table filtered to the target.
pub fn query_command(ip: &str) -> String {
    format!("arp -a {ip}")
}

/// Both separator renderings of a normalized hardware address.
///
/// Mapping tables print hardware addresses with dashes on some platforms and
/// colons on others; the probe accepts either rendering.
pub fn mac_renderings(mac: &str) -> (String, String) {
    (mac.replace(':', "-"), mac.replace('-', ":"))
}

/// Run one probe cycle: invalidate, echo, query.
///
/// The first two commands are best-effort; their output and failures are
/// ignored. A failed query reads as empty table text. Returns whether the
/// expected hardware address appeared in the (uppercased) query output.
pub fn run_probe<R: CommandRunner>(runner: &R, ip: &str, mac: &str) -> bool {
    let _ = runner.run(&invalidate_command(ip));
    let _ = runner.run(&echo_command(ip));

    let table = runner
        .run(&query_command(ip))
        .map(|output| output.stdout.to_uppercase())
        .unwrap_or_default();

    let (dashed, coloned) = mac_renderings(mac);
    table.contains(&dashed) || table.contains(&coloned)
}
