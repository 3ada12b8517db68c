//! Configuration data types for rkt-launch.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::compiler::CompileOptions;
use crate::error::ConfigError;
use crate::oneshot::ScriptSettings;

/// Container engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable written at the head of generated commands.
    #[default = "rkt"]
    pub binary: String,

    /// Transport scheme prefixed to image references.
    #[default = "docker"]
    pub image_scheme: String,

    /// Shell used to run generated text.
    #[default = "/bin/sh"]
    pub shell: String,
}

/// Service manager settings used by background and oneshot launches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct ServiceConfig {
    /// Transient unit launcher.
    #[default = "systemd-run"]
    pub run: String,

    /// Unit controller used for cleanup.
    #[default = "systemctl"]
    pub control: String,

    /// Prefix of generated unit names and readiness files.
    #[default = "rkt-launch"]
    pub unit_prefix: String,
}

/// Oneshot orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct OneshotConfig {
    /// Directory for readiness files.
    #[default(Utf8PathBuf::from("/tmp"))]
    pub state_dir: Utf8PathBuf,

    /// Readiness poll interval in milliseconds.
    #[default = 200]
    pub poll_interval_ms: u64,

    /// Run `rkt enter` through `sudo`.
    #[default = true]
    pub privileged_enter: bool,
}

/// Root application configuration.
///
/// Loaded from configuration files, environment variables, and command-line
/// arguments with layered precedence (lowest to highest): defaults,
/// configuration file, environment variables, command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path given with `--config`
/// 2. Path specified via `RKT_LAUNCH_CONFIG_PATH`
/// 3. `.rkt-launch.toml` in the current working directory
/// 4. `.rkt-launch.toml` in the home directory
/// 5. `~/.config/rkt-launch/config.toml` (XDG default)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "RKT_LAUNCH",
    post_merge_hook,
    discovery(
        app_name = "rkt-launch",
        env_var = "RKT_LAUNCH_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".rkt-launch.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// Log filter directive used when `RKT_LAUNCH_LOG` is unset.
    pub log_filter: Option<String>,

    /// Container engine configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub engine: EngineConfig,

    /// Service manager configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub service: ServiceConfig,

    /// Oneshot configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub oneshot: OneshotConfig,
}

impl AppConfig {
    /// Checks values that would otherwise produce a broken command.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty executable name or
    /// unit prefix, or a zero poll interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("engine.binary", &self.engine.binary),
            ("engine.image_scheme", &self.engine.image_scheme),
            ("engine.shell", &self.engine.shell),
            ("service.run", &self.service.run),
            ("service.control", &self.service.control),
            ("service.unit_prefix", &self.service.unit_prefix),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: (*field).to_owned(),
                reason: String::from("must not be empty"),
            });
        }
        if self.oneshot.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("oneshot.poll_interval_ms"),
                reason: String::from("must be greater than zero"),
            });
        }
        Ok(())
    }

    /// Options for compiling `rkt run` commands.
    #[must_use]
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            engine: self.engine.binary.clone(),
            image_scheme: self.engine.image_scheme.clone(),
            extra_flags: Vec::new(),
        }
    }

    /// Settings for oneshot script assembly.
    #[must_use]
    pub fn script_settings(&self) -> ScriptSettings {
        ScriptSettings {
            service_run: self.service.run.clone(),
            service_control: self.service.control.clone(),
            unit_prefix: self.service.unit_prefix.clone(),
            state_dir: self.oneshot.state_dir.clone(),
            poll_interval: Duration::from_millis(self.oneshot.poll_interval_ms),
            privileged_enter: self.oneshot.privileged_enter,
        }
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        for value in [
            &mut self.engine.binary,
            &mut self.engine.image_scheme,
            &mut self.engine.shell,
            &mut self.service.run,
            &mut self.service.control,
            &mut self.service.unit_prefix,
        ] {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_owned();
            }
        }
        self.log_filter = self
            .log_filter
            .take()
            .map(|filter| filter.trim().to_owned())
            .filter(|filter| !filter.is_empty());
        Ok(())
    }
}
