//! External diagnostic commands.
//!
//! The collector only sees command output as text. Any failure to produce
//! output (spawn error, non-zero exit, timeout) becomes an empty string.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_STEP: Duration = Duration::from_millis(10);

/// A fixed program plus argument list. Arguments are never passed through a shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl DiagnosticCommand {
    /// Smart battery registry entry (fast path).
    pub const BATTERY_INFO: DiagnosticCommand = DiagnosticCommand {
        program: "ioreg",
        args: &["-w0", "-rn", "AppleSmartBattery"],
    };

    /// Power profile report, source of the battery condition.
    pub const POWER_PROFILE: DiagnosticCommand = DiagnosticCommand {
        program: "system_profiler",
        args: &["SPPowerDataType"],
    };

    /// Power management settings, source of the low power mode flag.
    pub const POWER_SETTINGS: DiagnosticCommand = DiagnosticCommand {
        program: "pmset",
        args: &["-g"],
    };
}

/// Runs a program and returns its standard output as text.
///
/// Implementations must not fail: anything that goes wrong yields `""`.
pub trait CommandRunner: Send {
    fn run(&self, program: &str, args: &[&str]) -> String;

    fn run_diagnostic(&self, command: &DiagnosticCommand) -> String {
        self.run(command.program, command.args)
    }
}

/// Runs real processes with a bounded timeout.
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_COMMAND_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn try_run(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| log::debug!("Failed to spawn {}: {}", program, e))
            .ok()?;

        // Drain stdout concurrently so a chatty command cannot block on a full pipe
        let mut stdout = child.stdout.take()?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut out = Vec::new();
            let _ = stdout.read_to_end(&mut out);
            let _ = tx.send(out);
        });

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= self.timeout {
                        log::debug!("{} timed out after {:?}", program, self.timeout);
                        let _ = child.kill();
                        let _ = child.wait();
                        return None;
                    }
                    thread::sleep(POLL_STEP);
                }
                Err(e) => {
                    log::debug!("Failed to wait for {}: {}", program, e);
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
            }
        };

        if !status.success() {
            log::debug!("{} exited with {}", program, status);
            return None;
        }

        // A background descendant can hold stdout open after the child exits
        match rx.recv_timeout(self.timeout.saturating_sub(start.elapsed())) {
            Ok(out) => Some(String::from_utf8_lossy(&out).into_owned()),
            Err(_) => {
                log::debug!("{} left stdout open past {:?}", program, self.timeout);
                None
            }
        }
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> String {
        self.try_run(program, args).unwrap_or_default()
    }
}
