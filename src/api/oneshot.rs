//! Oneshot orchestration for the `oneshot` command.

use std::io::Write;

use tracing::info;

use crate::compiler::CommandText;
use crate::config::AppConfig;
use crate::engine::ScriptRunner;
use crate::error::Result as LaunchResult;
use crate::launch_id::LaunchId;
use crate::manifest::Manifest;
use crate::oneshot::{OneshotSelection, build_script};

use super::{CommandOutcome, ExecutionMode, deliver};

/// Parameters for running one command inside a freshly launched pod.
///
/// `selection` comes from [`OneshotRequest::validate`], so argument
/// combination errors are reported before the manifest is even read.
///
/// [`OneshotRequest::validate`]: crate::oneshot::OneshotRequest::validate
pub struct OneshotParams<'a, R: ScriptRunner + ?Sized, W: Write + ?Sized> {
    /// Application configuration.
    pub config: &'a AppConfig,
    /// Validated manifest.
    pub manifest: &'a Manifest,
    /// App and command source.
    pub selection: &'a OneshotSelection,
    /// Print and/or execute.
    pub mode: ExecutionMode,
    /// Identifier shared by the unit and the readiness file.
    pub launch_id: &'a LaunchId,
    /// Executes the generated script.
    pub runner: &'a R,
    /// Receives printed script text.
    pub out: &'a mut W,
}

/// Resolves the command and builds the oneshot script.
///
/// # Errors
///
/// Returns `LaunchError::Argument` for an unknown oneshot name or app and
/// `LaunchError::Manifest` if compilation fails.
pub fn plan_oneshot(
    config: &AppConfig,
    manifest: &Manifest,
    selection: &OneshotSelection,
    launch_id: &LaunchId,
) -> LaunchResult<CommandText> {
    let target = selection.resolve(manifest)?;
    info!(app = %target.app, %launch_id, "planning oneshot");
    let script = build_script(
        manifest,
        &target,
        launch_id,
        config.compile_options(),
        &config.script_settings(),
    )?;
    Ok(script)
}

/// Launches the pod, runs the command inside the app, and tears the pod down.
///
/// The returned outcome carries the command's own exit status; cleanup
/// failures never change it.
///
/// # Errors
///
/// Returns any error from [`plan_oneshot`], or `LaunchError::Process` if the
/// text cannot be printed or the shell cannot be started.
pub fn oneshot<R, W>(params: OneshotParams<'_, R, W>) -> LaunchResult<CommandOutcome>
where
    R: ScriptRunner + ?Sized,
    W: Write + ?Sized,
{
    let OneshotParams {
        config,
        manifest,
        selection,
        mode,
        launch_id,
        runner,
        out,
    } = params;

    let text = plan_oneshot(config, manifest, selection, launch_id)?.render();
    deliver(&text, mode, runner, out)
}
