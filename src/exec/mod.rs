// ABOUTME: Process executor for external commands with bounded run time.
// ABOUTME: Failures and timeouts come back as data, never as errors.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Ceiling applied to every command regardless of the requested timeout.
pub const HARD_TIMEOUT: Duration = Duration::from_secs(300);

/// Exit code reported when a command timed out or could not be spawned.
pub const NO_EXIT_CODE: i32 = -1;

/// Outcome of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Real process exit code, or [`NO_EXIT_CODE`] for timeouts and spawn failures.
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn exited(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: exit_code == 0,
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: reason.into(),
            exit_code: NO_EXIT_CODE,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.exit_code == NO_EXIT_CODE
    }

    /// Non-empty stdout lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().map(str::trim).filter(|l| !l.is_empty())
    }
}

/// Runs an argv-style command.
///
/// Implementations must not return early with a panic or error for non-zero
/// exits; everything is folded into [`CommandOutput`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, argv: &[String], timeout: Duration) -> CommandOutput;
}

/// Runs commands as local child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandRunner for ProcessExecutor {
    async fn run(&self, argv: &[String], timeout: Duration) -> CommandOutput {
        let Some((program, args)) = argv.split_first() else {
            return CommandOutput::aborted("empty command");
        };

        let timeout = timeout.min(HARD_TIMEOUT);
        tracing::debug!(command = %argv.join(" "), ?timeout, "running command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("failed to spawn {}: {}", program, e);
                return CommandOutput::aborted(e.to_string());
            }
        };

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let result = CommandOutput::exited(
                    // Signal-terminated processes have no code.
                    output.status.code().unwrap_or(NO_EXIT_CODE),
                    String::from_utf8_lossy(&output.stdout).trim(),
                    String::from_utf8_lossy(&output.stderr).trim(),
                );
                if !result.success {
                    tracing::debug!(
                        exit_code = result.exit_code,
                        stderr = %result.stderr,
                        "command failed"
                    );
                }
                result
            }
            Ok(Err(e)) => CommandOutput::aborted(e.to_string()),
            Err(_elapsed) => {
                tracing::warn!("command timed out after {:?}: {}", timeout, argv.join(" "));
                CommandOutput::aborted("command timed out")
            }
        }
    }
}

/// Build an argv vector from string-ish parts.
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
