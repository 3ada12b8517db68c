//! Orchestration API for rkt-launch commands.
//!
//! This module provides the public orchestration functions for each command:
//! [`up`] and [`oneshot`]. They contain the logic behind the CLI, so library
//! embedders get the same behaviour.
//!
//! All functions accept library-owned types (not clap types) and return
//! [`crate::error::Result<CommandOutcome>`]. Printed command text goes to a
//! caller-supplied writer and execution goes through a
//! [`ScriptRunner`](crate::engine::ScriptRunner); nothing here touches stdout
//! or spawns a process directly.

mod oneshot;
mod up;

pub use oneshot::{OneshotParams, oneshot, plan_oneshot};
pub use up::{UpParams, plan_up, up};

use std::io::Write;

use tracing::debug;

use crate::engine::ScriptRunner;
use crate::error::{ProcessError, Result as LaunchResult};

/// Outcome of an rkt-launch command.
///
/// Commands return either outright success or the non-zero exit code of the
/// generated command, which the CLI adapter maps to its own exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command completed successfully (exit code 0), or was only printed.
    Success,
    /// The generated command exited with a non-zero code.
    CommandExit {
        /// The exit code reported by the shell.
        code: i32,
    },
}

impl CommandOutcome {
    /// Maps a shell exit code to an outcome.
    #[must_use]
    pub const fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::CommandExit { code }
        }
    }
}

/// How generated text is presented and executed.
///
/// `--norun` wins over `--verbose`. Wrapping in a service unit
/// (`up --background`) is independent of the mode: a background launch in
/// normal mode is executed without printing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Execute without printing.
    #[default]
    Normal,
    /// Print without executing.
    DryRun,
    /// Print, then execute exactly the printed text.
    Verbose,
}

impl ExecutionMode {
    /// Selects a mode from the `--norun` and `--verbose` flags.
    #[must_use]
    pub const fn from_flags(norun: bool, verbose: bool) -> Self {
        if norun {
            Self::DryRun
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Whether the generated text is written to the output stream.
    #[must_use]
    pub const fn prints(self) -> bool {
        matches!(self, Self::DryRun | Self::Verbose)
    }

    /// Whether the generated text is handed to the runner.
    #[must_use]
    pub const fn executes(self) -> bool {
        !matches!(self, Self::DryRun)
    }
}

/// Prints and/or executes `text` according to `mode`.
fn deliver<R, W>(
    text: &str,
    mode: ExecutionMode,
    runner: &R,
    out: &mut W,
) -> LaunchResult<CommandOutcome>
where
    R: ScriptRunner + ?Sized,
    W: Write + ?Sized,
{
    debug!(?mode, bytes = text.len(), "delivering generated command");
    if mode.prints() {
        writeln!(out, "{text}")
            .and_then(|()| out.flush())
            .map_err(|e| ProcessError::OutputFailed {
                message: e.to_string(),
            })?;
    }
    if !mode.executes() {
        return Ok(CommandOutcome::Success);
    }
    let code = runner.run(text)?;
    Ok(CommandOutcome::from_exit_code(code))
}
