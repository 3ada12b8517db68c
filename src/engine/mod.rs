//! Execution of generated shell text.
//!
//! The planner never spawns processes itself. It hands finished text to a
//! [`ScriptRunner`], which runs it through a shell and reports the exit code.
//! [`ShellRunner`] is the production implementation; tests substitute a
//! recording runner or a `mockall` mock.
//!
//! Standard input, output, and error are inherited, so an interactive
//! `rkt run` or `rkt enter` behaves as if typed at a terminal.

use std::process::{Command, ExitStatus};

use tracing::{debug, info};

use crate::error::ProcessError;

/// Default shell used to interpret generated text.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Runs generated shell text and reports its exit code.
#[cfg_attr(test, mockall::automock)]
pub trait ScriptRunner {
    /// Runs `script` to completion and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError` if the interpreter cannot be started or reports
    /// no status.
    fn run(&self, script: &str) -> Result<i32, ProcessError>;
}

/// Runs scripts as `<shell> -c <script>` with inherited stdio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ShellRunner {
    /// Creates a runner using `shell` as interpreter.
    #[must_use]
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Interpreter path.
    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl ScriptRunner for ShellRunner {
    fn run(&self, script: &str) -> Result<i32, ProcessError> {
        info!(shell = %self.shell, "running generated command");
        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(script)
            .status()
            .map_err(|e| ProcessError::SpawnFailed {
                program: self.shell.clone(),
                message: e.to_string(),
            })?;
        let code = exit_code(status).ok_or_else(|| ProcessError::NoExitStatus {
            program: self.shell.clone(),
        })?;
        debug!(code, "generated command finished");
        Ok(code)
    }
}

/// Maps a child status to a shell-style exit code.
///
/// A child killed by signal `N` maps to `128 + N`.
#[must_use]
pub fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code().or_else(|| signal_code(status))
}

#[cfg(unix)]
fn signal_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map(|signal| 128 + signal)
}

#[cfg(not(unix))]
const fn signal_code(_status: ExitStatus) -> Option<i32> {
    None
}
