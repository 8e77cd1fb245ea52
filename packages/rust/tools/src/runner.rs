//! Thin command-runner abstraction: invoke an external tool, capture its
//! output, enforce a timeout.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use docexport_shared::{DocExportError, Result};

/// Timeout used when none is set explicitly.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for `--version` style availability checks.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// ToolCommand / ToolOutput
// ---------------------------------------------------------------------------

/// A fully described external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

/// Runs external commands. Non-zero exits are returned as output, not errors;
/// use [`run_checked`] to treat them as failures.
pub trait CommandRunner {
    fn run(&self, command: &ToolCommand) -> impl Future<Output = Result<ToolOutput>>;
}

/// Spawns real processes through `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        debug!(
            command = %command.display(),
            timeout_secs = command.timeout.as_secs(),
            "spawning tool"
        );

        let child = cmd
            .spawn()
            .map_err(|e| spawn_error(&command.program, e))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        match timeout(command.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ToolOutput {
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(e)) => Err(DocExportError::ToolFailed {
                tool: command.program.clone(),
                status: None,
                stderr: format!("failed to collect output: {e}"),
            }),
            Err(_) => {
                warn!(command = %command.display(), "tool timed out, killed");
                Err(DocExportError::Timeout {
                    tool: command.program.clone(),
                    timeout: command.timeout,
                })
            }
        }
    }
}

fn spawn_error(program: &str, e: std::io::Error) -> DocExportError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DocExportError::ToolNotFound {
            tool: program.to_string(),
            message: e.to_string(),
        }
    } else {
        DocExportError::ToolFailed {
            tool: program.to_string(),
            status: None,
            stderr: format!("failed to spawn: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a command and turn a non-zero exit into [`DocExportError::ToolFailed`]
/// carrying the tool's stderr verbatim.
pub async fn run_checked<R: CommandRunner>(runner: &R, command: &ToolCommand) -> Result<ToolOutput> {
    let output = runner.run(command).await?;
    if output.success() {
        return Ok(output);
    }

    Err(DocExportError::ToolFailed {
        tool: command.program.clone(),
        status: output.status,
        stderr: output.stderr,
    })
}

/// True when `program args…` runs and exits zero within [`PROBE_TIMEOUT`].
pub async fn probe<R: CommandRunner>(runner: &R, program: &str, args: &[&str]) -> bool {
    let command = ToolCommand::new(program)
        .args(args.iter().copied())
        .timeout(PROBE_TIMEOUT);

    match runner.run(&command).await {
        Ok(output) => output.success(),
        Err(e) => {
            debug!(program, error = %e, "probe failed");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
