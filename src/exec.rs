//! Shell command execution behind an injectable [`Executor`] trait.
use anyhow::{Context as _, Result};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Which standard streams a command shares with the terminal.
///
/// Streams that are not inherited are connected to the null device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streams {
    /// Inherit standard input.
    pub stdin: bool,
    /// Inherit standard output.
    pub stdout: bool,
    /// Inherit standard error.
    pub stderr: bool,
}

impl Streams {
    /// Every stream suppressed.
    pub const QUIET: Self = Self {
        stdin: false,
        stdout: false,
        stderr: false,
    };
}

/// Result of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Exit code, when the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<ExitStatus> for ExecResult {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Runs shell command lines.
///
/// The link `if` test and the `shell` directive go through this trait so
/// tests can substitute `MockExecutor` for real subprocesses.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `command` through the user's shell with `cwd` as working directory.
    ///
    /// A non-zero exit is reported through [`ExecResult::success`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell process cannot be spawned.
    fn shell(&self, command: &str, cwd: &Path, streams: Streams) -> Result<ExecResult>;
}

/// Production [`Executor`] that spawns `$SHELL -c` (or `cmd /C` on Windows).
#[derive(Debug, Default)]
pub struct SystemExecutor;

/// Return the program and flag used to run a command line.
fn shell_program() -> (String, &'static str) {
    if cfg!(windows) {
        (
            std::env::var("COMSPEC").unwrap_or_else(|_| "cmd".to_string()),
            "/C",
        )
    } else {
        (
            std::env::var("SHELL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "sh".to_string()),
            "-c",
        )
    }
}

/// Map an inherit flag to the matching [`Stdio`].
fn stdio(inherit: bool) -> Stdio {
    if inherit { Stdio::inherit() } else { Stdio::null() }
}

impl Executor for SystemExecutor {
    fn shell(&self, command: &str, cwd: &Path, streams: Streams) -> Result<ExecResult> {
        let (program, flag) = shell_program();
        let status = Command::new(&program)
            .arg(flag)
            .arg(command)
            .current_dir(cwd)
            .stdin(stdio(streams.stdin))
            .stdout(stdio(streams.stdout))
            .stderr(stdio(streams.stderr))
            .status()
            .with_context(|| format!("failed to execute: {program} {flag} {command}"))?;
        Ok(ExecResult::from(status))
    }
}
