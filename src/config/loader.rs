//! Configuration loading with layered precedence.
//!
//! This module loads configuration with the precedence order (lowest to
//! highest): application defaults, configuration file, environment variables,
//! command-line arguments.
//!
//! # Manual Layer Composition
//!
//! The layers are pushed into a `MergeComposer` by hand rather than through
//! `OrthoConfig::load()`:
//!
//! 1. The `Cli` struct owns subcommand dispatch, so `OrthoConfig` cannot own
//!    CLI parsing.
//! 2. Typed environment variables fail fast instead of being ignored when
//!    unparseable.
//! 3. `--config` must be honoured before discovery falls back to XDG paths.
//!
//! # Environment Variable Handling
//!
//! String fields (e.g. `RKT_LAUNCH_ENGINE_BINARY`) are always accepted. Typed
//! fields such as `RKT_LAUNCH_ONESHOT_PRIVILEGED_ENTER` (bool) or
//! `RKT_LAUNCH_ONESHOT_POLL_INTERVAL_MS` (u64) must parse, or loading fails
//! with an error naming the variable.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};
use tracing::debug;

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

// ============================================================================
// Environment Variable Specification Table
// ============================================================================

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `RKT_LAUNCH_ENGINE_BINARY`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["engine", "binary"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "RKT_LAUNCH_LOG_FILTER",
        path: &["log_filter"],
        var_type: EnvVarType::String,
    },
    // Engine fields
    EnvVarSpec {
        env_var: "RKT_LAUNCH_ENGINE_BINARY",
        path: &["engine", "binary"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "RKT_LAUNCH_ENGINE_IMAGE_SCHEME",
        path: &["engine", "image_scheme"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "RKT_LAUNCH_ENGINE_SHELL",
        path: &["engine", "shell"],
        var_type: EnvVarType::String,
    },
    // Service fields
    EnvVarSpec {
        env_var: "RKT_LAUNCH_SERVICE_RUN",
        path: &["service", "run"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "RKT_LAUNCH_SERVICE_CONTROL",
        path: &["service", "control"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "RKT_LAUNCH_SERVICE_UNIT_PREFIX",
        path: &["service", "unit_prefix"],
        var_type: EnvVarType::String,
    },
    // Oneshot fields
    EnvVarSpec {
        env_var: "RKT_LAUNCH_ONESHOT_STATE_DIR",
        path: &["oneshot", "state_dir"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "RKT_LAUNCH_ONESHOT_POLL_INTERVAL_MS",
        path: &["oneshot", "poll_interval_ms"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "RKT_LAUNCH_ONESHOT_PRIVILEGED_ENTER",
        path: &["oneshot", "privileged_enter"],
        var_type: EnvVarType::Bool,
    },
];

/// Returns the environment variable names recognised by the config loader.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
///
/// Uses `cap_std::fs_utf8`, opening the parent directory of the config file
/// and reading from there.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or(current_dir.as_path());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    debug!(%path, "loaded configuration file");
    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Load configuration with full layer precedence.
///
/// Sources, lowest to highest:
/// 1. Application defaults
/// 2. Configuration file (`--config`, or discovered via `RKT_LAUNCH_CONFIG_PATH`
///    and XDG paths)
/// 3. `RKT_LAUNCH_*` environment variables read through `env`
/// 4. Command-line arguments (`--rkt`, which selects the program that
///    receives the generated command)
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file named by `--config` cannot be read
/// - A configuration file is malformed
/// - A typed environment variable does not parse
/// - The merged configuration fails [`AppConfig::validate`]
pub fn load_config<E: mockable::Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    let config_path: Option<Utf8PathBuf> =
        cli.config.clone().or_else(|| {
            let discovery = ConfigDiscovery::builder("rkt-launch")
                .env_var("RKT_LAUNCH_CONFIG_PATH")
                .config_file_name("config.toml")
                .dotfile_name(".rkt-launch.toml")
                .build();
            discovery
                .candidates()
                .into_iter()
                .filter(|p| p.exists())
                .find_map(|p| Utf8PathBuf::try_from(p).ok())
        });

    if let Some(ref path) = config_path {
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.validate()?;

    Ok(config)
}

/// Collect `RKT_LAUNCH_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed variable (bool, u64) does
/// not parse.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Bool => match raw_value.parse::<bool>() {
                Ok(b) => Value::Bool(b),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected bool (true/false), got '{raw_value}'"),
                    }
                    .into());
                }
            },
            EnvVarType::U64 => match raw_value.parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating parents as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref program) = cli.rkt {
        insert_at_path(
            &mut overrides,
            &["engine", "shell"],
            Value::String(program.clone()),
        );
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
