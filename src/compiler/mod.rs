//! Manifest to `rkt run` compilation.
//!
//! [`compile`] is a pure function: the same manifest and options always
//! produce byte-identical text. The output nests as follows:
//!
//! ```text
//! rkt \
//!   run \
//!     --dns=host \                         meta flags, sorted by name
//!     --volume=data,kind=host,source=/srv \ volumes, declaration order
//!     docker://image \                     one image line per app
//!       --environment=A=1 \                app flags, sorted by name
//!       --name=app \
//!       --exec=/bin/app \                  exec always last
//!       -- --verbose \
//!       ---
//! ```

mod flags;
mod layout;
mod seccomp;

pub use flags::{APP_TERMINATOR, AppFlag, MetaFlag, sort_app_flags, sort_meta_flags};
pub use layout::{CommandText, Line, quote_word};
pub use seccomp::{SeccompMode, seccomp_value};

use tracing::debug;

use crate::error::ManifestError;
use crate::manifest::{AppSpec, Manifest, VolumeSpec, validate};

/// Engine executable written at the head of generated commands.
pub const DEFAULT_ENGINE: &str = "rkt";

/// Transport scheme prefixed to image references.
pub const DEFAULT_IMAGE_SCHEME: &str = "docker";

/// Settings that shape the generated command without coming from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Engine executable, e.g. `rkt` or `/usr/bin/rkt`.
    pub engine: String,
    /// Image transport scheme, e.g. `docker`.
    pub image_scheme: String,
    /// Extra pod-scope flags merged into the manifest's `__meta__.cli`.
    pub extra_flags: Vec<MetaFlag>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            engine: String::from(DEFAULT_ENGINE),
            image_scheme: String::from(DEFAULT_IMAGE_SCHEME),
            extra_flags: Vec::new(),
        }
    }
}

impl CompileOptions {
    /// Adds a pod-scope flag.
    #[must_use]
    pub fn with_flag(mut self, flag: MetaFlag) -> Self {
        self.extra_flags.push(flag);
        self
    }
}

/// Compiles `manifest` into an `<engine> run ...` command.
///
/// # Errors
///
/// Returns any `ManifestError` from [`validate`]; a manifest without apps
/// never produces a command.
pub fn compile(
    manifest: &Manifest,
    options: &CompileOptions,
) -> Result<CommandText, ManifestError> {
    validate(manifest)?;

    let mut text = CommandText::new();
    text.push_word(0, &options.engine);
    text.push_word(1, "run");

    for flag in meta_flags(manifest, options) {
        text.push_word(2, &flag.render());
    }
    for volume in &manifest.volumes {
        text.push_word(2, &volume_flag(volume));
    }

    for app in &manifest.apps {
        text.push_word(2, &format!("{}://{}", options.image_scheme, app.image));
        for flag in app_flags(app)? {
            flag.render_into(&mut text, 3);
        }
    }

    debug!(
        apps = manifest.apps.len(),
        lines = text.lines().len(),
        "compiled run command"
    );
    Ok(text)
}

/// Wraps `command` in `<service_run> --unit=<unit>`.
#[must_use]
pub fn wrap_in_unit(command: CommandText, service_run: &str, unit: &str) -> CommandText {
    let mut text = CommandText::new();
    text.push_word(0, service_run);
    text.push_word(1, &format!("--unit={unit}"));
    text.append_nested(command, 1);
    text
}

fn meta_flags(manifest: &Manifest, options: &CompileOptions) -> Vec<MetaFlag> {
    let mut flags: Vec<MetaFlag> = manifest
        .meta
        .cli
        .iter()
        .map(|(name, value)| MetaFlag::new(name.as_str(), value.as_str()))
        .chain(options.extra_flags.iter().cloned())
        .collect();
    sort_meta_flags(&mut flags);
    flags
}

fn volume_flag(volume: &VolumeSpec) -> String {
    format!(
        "--volume={},kind={},source={}",
        volume.name, volume.kind, volume.source
    )
}

/// Collects an app's flags in canonical order.
///
/// # Errors
///
/// Returns `ManifestError::UnsupportedIsolator` for a non-seccomp isolator.
pub fn app_flags(app: &AppSpec) -> Result<Vec<AppFlag>, ManifestError> {
    let mut flags = Vec::new();

    flags.extend(
        app.environment
            .iter()
            .map(|var| AppFlag::Environment(format!("{}={}", var.name, var.value))),
    );
    flags.extend(
        app.mounts
            .iter()
            .map(|mount| AppFlag::Mount(format!("volume={},target={}", mount.volume, mount.path))),
    );
    flags.push(AppFlag::Name(app.name.clone()));
    flags.extend(app.app.ports.iter().map(|port| {
        AppFlag::Port(format!(
            "{}:{}",
            port.name.as_deref().unwrap_or_default(),
            port.port
        ))
    }));
    for isolator in &app.app.isolators {
        let value = seccomp_value(isolator).ok_or_else(|| ManifestError::UnsupportedIsolator {
            app: app.name.clone(),
            isolator: isolator.name.clone(),
        })?;
        flags.push(AppFlag::Seccomp(value));
    }
    if let Some((command, args)) = app.app.exec.split_first() {
        flags.push(AppFlag::Exec {
            command: command.clone(),
            args: args.to_vec(),
        });
    }

    sort_app_flags(&mut flags);
    Ok(flags)
}
