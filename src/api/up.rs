//! Pod launch orchestration for the `up` command.

use std::io::Write;

use tracing::info;

use crate::compiler::{CommandText, compile, wrap_in_unit};
use crate::config::AppConfig;
use crate::engine::ScriptRunner;
use crate::error::{ManifestError, Result as LaunchResult};
use crate::launch_id::LaunchId;
use crate::manifest::Manifest;

use super::{CommandOutcome, ExecutionMode, deliver};

/// Parameters for launching a pod.
pub struct UpParams<'a, R: ScriptRunner + ?Sized, W: Write + ?Sized> {
    /// Application configuration (engine, service manager).
    pub config: &'a AppConfig,
    /// Validated manifest.
    pub manifest: &'a Manifest,
    /// Print and/or execute.
    pub mode: ExecutionMode,
    /// Wrap the command in a transient service unit.
    pub background: bool,
    /// Identifier naming the service unit in background launches.
    pub launch_id: &'a LaunchId,
    /// Executes the generated command.
    pub runner: &'a R,
    /// Receives printed command text.
    pub out: &'a mut W,
}

/// Compiles the launch command, wrapped in a service unit when `background`
/// is set.
///
/// # Errors
///
/// Returns any `ManifestError` raised during compilation.
pub fn plan_up(
    config: &AppConfig,
    manifest: &Manifest,
    background: bool,
    launch_id: &LaunchId,
) -> Result<CommandText, ManifestError> {
    let command = compile(manifest, &config.compile_options())?;
    if !background {
        return Ok(command);
    }
    let unit = launch_id.unit_name(&config.service.unit_prefix);
    info!(%unit, "launching pod in background unit");
    Ok(wrap_in_unit(command, &config.service.run, &unit))
}

/// Launches the pod described by the manifest.
///
/// # Errors
///
/// Returns `LaunchError` variants:
/// - `Manifest` if compilation fails; nothing is printed or executed.
/// - `Process` if the text cannot be printed or the shell cannot be started.
pub fn up<R, W>(params: UpParams<'_, R, W>) -> LaunchResult<CommandOutcome>
where
    R: ScriptRunner + ?Sized,
    W: Write + ?Sized,
{
    let UpParams {
        config,
        manifest,
        mode,
        background,
        launch_id,
        runner,
        out,
    } = params;

    let text = plan_up(config, manifest, background, launch_id)?.render();
    deliver(&text, mode, runner, out)
}
