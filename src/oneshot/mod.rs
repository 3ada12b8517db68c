//! Oneshot orchestration: launch, wait, enter, clean up, exit.
//!
//! The generated script is an ordered list of [`Stage`]s. Each stage renders
//! its own fragment and [`assemble`] joins them in causal order:
//!
//! 1. [`Stage::Launch`] starts the pod under a transient service unit and asks
//!    the engine to save the pod UUID into the readiness file.
//! 2. [`Stage::AwaitReadiness`] polls until the readiness file is non-empty.
//! 3. [`Stage::Enter`] runs the command inside the app and captures `$?`.
//! 4. [`Stage::Cleanup`] stops the unit, resets its failed state, and removes
//!    the readiness file, whatever the command returned.
//! 5. [`Stage::Exit`] exits with the captured status.
//!
//! Cleanup steps are separated by `;` rather than `&&`, so their own failures
//! cannot change the exit status.

use std::time::Duration;

use camino::Utf8PathBuf;
use tracing::debug;

use crate::compiler::{
    CommandText, CompileOptions, MetaFlag, compile, quote_word, wrap_in_unit,
};
use crate::error::{ArgumentError, ManifestError};
use crate::launch_id::{DEFAULT_UNIT_PREFIX, LaunchId};
use crate::manifest::Manifest;

/// Engine flag that makes `rkt run` write the pod UUID to a file.
pub const UUID_FILE_FLAG: &str = "uuid-file-save";

/// Caller-supplied oneshot arguments, before validation.
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneshotRequest {
    /// App to enter.
    pub app: Option<String>,
    /// Literal command to run.
    pub cmd: Option<String>,
    /// Name of a command in `__meta__.oneshot`.
    pub name: Option<String>,
}

/// Where the oneshot command comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CommandSource {
    /// `--cmd`: used verbatim.
    Literal(String),
    /// `--name`: looked up in the manifest.
    Named(String),
}

/// A request whose argument combination is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneshotSelection {
    app: String,
    source: CommandSource,
}

/// App and resolved command for the enter stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneshotTarget {
    /// App to enter.
    pub app: String,
    /// Shell command run inside the app.
    pub command: String,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl OneshotRequest {
    /// Checks the argument combination.
    ///
    /// # Errors
    ///
    /// - `ArgumentError::MissingApp` without `--app`.
    /// - `ArgumentError::MissingCommand` with neither `--cmd` nor `--name`.
    /// - `ArgumentError::ConflictingCommand` with both.
    pub fn validate(&self) -> Result<OneshotSelection, ArgumentError> {
        let app = present(self.app.as_ref()).ok_or(ArgumentError::MissingApp)?;
        let source = match (present(self.cmd.as_ref()), present(self.name.as_ref())) {
            (None, None) => return Err(ArgumentError::MissingCommand),
            (Some(_), Some(_)) => return Err(ArgumentError::ConflictingCommand),
            (Some(cmd), None) => CommandSource::Literal(cmd.to_owned()),
            (None, Some(name)) => CommandSource::Named(name.to_owned()),
        };
        Ok(OneshotSelection {
            app: app.to_owned(),
            source,
        })
    }
}

impl OneshotSelection {
    /// Resolves the command against `manifest`.
    ///
    /// # Errors
    ///
    /// - `ArgumentError::UnknownOneshot` if `--name` is not in `__meta__.oneshot`.
    /// - `ArgumentError::UnknownApp` if `--app` is not an app of the manifest.
    pub fn resolve(&self, manifest: &Manifest) -> Result<OneshotTarget, ArgumentError> {
        let command = match &self.source {
            CommandSource::Literal(cmd) => cmd.clone(),
            CommandSource::Named(name) => manifest
                .oneshot(name)
                .ok_or_else(|| ArgumentError::UnknownOneshot { name: name.clone() })?
                .to_owned(),
        };
        if manifest.app(&self.app).is_none() {
            return Err(ArgumentError::UnknownApp {
                app: self.app.clone(),
            });
        }
        Ok(OneshotTarget {
            app: self.app.clone(),
            command,
        })
    }
}

/// External programs and timing used by the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSettings {
    /// Service launcher, e.g. `systemd-run`.
    pub service_run: String,
    /// Service controller, e.g. `systemctl`.
    pub service_control: String,
    /// Prefix of unit names and readiness files.
    pub unit_prefix: String,
    /// Directory holding readiness files.
    pub state_dir: Utf8PathBuf,
    /// Delay between readiness polls.
    pub poll_interval: Duration,
    /// Prefix `enter` with `sudo`.
    pub privileged_enter: bool,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            service_run: String::from("systemd-run"),
            service_control: String::from("systemctl"),
            unit_prefix: String::from(DEFAULT_UNIT_PREFIX),
            state_dir: Utf8PathBuf::from("/tmp"),
            poll_interval: Duration::from_millis(200),
            privileged_enter: true,
        }
    }
}

/// One step of the oneshot script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Start the pod under a service unit.
    Launch,
    /// Busy-wait on the readiness file.
    AwaitReadiness,
    /// Run the command inside the app and capture its status.
    Enter,
    /// Stop the unit and remove the readiness file.
    Cleanup,
    /// Exit with the captured status.
    Exit,
}

impl Stage {
    /// All stages in execution order.
    pub const ORDER: [Self; 5] = [
        Self::Launch,
        Self::AwaitReadiness,
        Self::Enter,
        Self::Cleanup,
        Self::Exit,
    ];

    fn render(self, plan: &ScriptPlan) -> CommandText {
        let mut text = CommandText::new();
        match self {
            Self::Launch => text.append_nested(plan.launch.clone(), 0),
            Self::AwaitReadiness => {
                text.push_raw(0, "&&");
                text.push_raw(
                    1,
                    format!(
                        "while [ ! -s {} ]; do sleep {}; printf .; done",
                        plan.readiness_file,
                        format_seconds(plan.poll_interval)
                    ),
                );
            }
            Self::Enter => {
                text.push_raw(0, "&&");
                text.push_raw(1, format!("{};", plan.enter));
                text.push_raw(0, "status=$? ;");
            }
            Self::Cleanup => {
                let control = &plan.service_control;
                let unit = &plan.unit;
                text.push_raw(0, format!("{control} stop {unit};"));
                text.push_raw(0, format!("{control} reset-failed {unit} 2>/dev/null;"));
                text.push_raw(0, format!("rm -f {};", plan.readiness_file));
            }
            Self::Exit => text.push_raw(0, "exit $status"),
        }
        text
    }
}

/// Everything the stages need, with names already quoted for the shell.
#[derive(Debug, Clone)]
struct ScriptPlan {
    launch: CommandText,
    unit: String,
    readiness_file: String,
    enter: String,
    service_control: String,
    poll_interval: Duration,
}

/// Joins the rendered stages in [`Stage::ORDER`].
fn assemble(plan: &ScriptPlan) -> CommandText {
    Stage::ORDER
        .iter()
        .fold(CommandText::new(), |mut script, stage| {
            script.append_nested(stage.render(plan), 0);
            script
        })
}

/// Builds the complete oneshot script for `target`.
///
/// `id` names both the unit and the readiness file. `options` carries the
/// engine and image scheme; the readiness flag is added here.
///
/// # Errors
///
/// Returns any `ManifestError` raised while compiling the run command.
pub fn build_script(
    manifest: &Manifest,
    target: &OneshotTarget,
    id: &LaunchId,
    options: CompileOptions,
    settings: &ScriptSettings,
) -> Result<CommandText, ManifestError> {
    let unit = id.unit_name(&settings.unit_prefix);
    let readiness_file = id.readiness_file(&settings.state_dir, &settings.unit_prefix);
    debug!(%unit, %readiness_file, app = %target.app, "building oneshot script");

    let engine = options.engine.clone();
    let run_options = options.with_flag(MetaFlag::new(UUID_FILE_FLAG, readiness_file.as_str()));
    let run = compile(manifest, &run_options)?;
    let launch = wrap_in_unit(run, &settings.service_run, &unit);

    let quoted_file = quote_word(readiness_file.as_str());
    let sudo = if settings.privileged_enter { "sudo " } else { "" };
    let enter = format!(
        "{sudo}{} enter {} `cat {quoted_file}` {}",
        quote_word(&engine),
        quote_word(&format!("--app={}", target.app)),
        target.command
    );

    let plan = ScriptPlan {
        launch,
        unit: quote_word(&unit),
        readiness_file: quoted_file,
        enter,
        service_control: quote_word(&settings.service_control),
        poll_interval: settings.poll_interval,
    };
    Ok(assemble(&plan))
}

/// Formats a duration as shell `sleep` seconds, e.g. `0.2`.
#[must_use]
pub fn format_seconds(interval: Duration) -> String {
    let secs = interval.as_secs();
    let millis = interval.subsec_millis();
    if millis == 0 {
        return secs.to_string();
    }
    let fraction = format!("{millis:03}");
    format!("{secs}.{}", fraction.trim_end_matches('0'))
}
