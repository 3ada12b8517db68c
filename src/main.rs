//! `rkt-launch` application entry point.
//!
//! The binary uses `eyre` for opaque error handling at the application
//! boundary, converting domain-specific errors into human-readable reports on
//! stderr. Stdout carries only printed command text.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/rkt-launch/config.toml` or path from
//!    `RKT_LAUNCH_CONFIG_PATH`)
//! 3. Environment variables (`RKT_LAUNCH_*`)
//! 4. Command-line arguments
//!
//! Logging goes to stderr, filtered by `RKT_LAUNCH_LOG` (falling back to the
//! configured `log_filter`, then `warn`).

use std::io;
use std::process::ExitCode;

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use mockable::DefaultEnv;
use rkt_launch::api::{self, CommandOutcome, OneshotParams, UpParams};
use rkt_launch::config::{AppConfig, Cli, Commands, ManifestArgs, load_config};
use rkt_launch::engine::ShellRunner;
use rkt_launch::error::Result as LaunchResult;
use rkt_launch::launch_id::LaunchId;
use rkt_launch::manifest::{self, EnvFallback, Manifest, RenderContext};
use rkt_launch::oneshot::OneshotRequest;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV_VAR: &str = "RKT_LAUNCH_LOG";

/// Filter used when neither the environment nor the config sets one.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Application entry point.
///
/// Parses the CLI, loads configuration, then dispatches to the subcommand.
/// A non-zero exit of the generated command becomes this process's exit code.
fn main() -> EyreResult<ExitCode> {
    let cli = Cli::parse();
    let env = DefaultEnv::new();

    let config = load_config(&cli, &env).map_err(Report::from)?;
    init_logging(&config, &env);

    let outcome = run(&cli, &config, &env).map_err(Report::from)?;
    Ok(exit_code(outcome))
}

/// Installs the stderr `tracing` subscriber.
fn init_logging<E: mockable::Env>(config: &AppConfig, env: &E) {
    let directive = env
        .string(LOG_ENV_VAR)
        .or_else(|| config.log_filter.clone())
        .unwrap_or_else(|| String::from(DEFAULT_LOG_FILTER));
    let filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run<E: mockable::Env>(cli: &Cli, config: &AppConfig, env: &E) -> LaunchResult<CommandOutcome> {
    let runner = ShellRunner::new(config.engine.shell.as_str());
    let launch_id = LaunchId::generate();
    let mode = cli.execution_mode();
    let mut out = io::stdout().lock();
    debug!(?mode, %launch_id, "dispatching command");

    match &cli.command {
        Commands::Up(args) => {
            let manifest = load_manifest(&args.manifest, env)?;
            api::up(UpParams {
                config,
                manifest: &manifest,
                mode,
                background: args.background,
                launch_id: &launch_id,
                runner: &runner,
                out: &mut out,
            })
        }
        Commands::Oneshot(args) => {
            let selection = OneshotRequest::from(args).validate()?;
            let manifest = load_manifest(&args.manifest, env)?;
            api::oneshot(OneshotParams {
                config,
                manifest: &manifest,
                selection: &selection,
                mode,
                launch_id: &launch_id,
                runner: &runner,
                out: &mut out,
            })
        }
    }
}

/// Resolves `--var` assignments over the environment and loads the manifest.
fn load_manifest<E: mockable::Env>(args: &ManifestArgs, env: &E) -> LaunchResult<Manifest> {
    let context = RenderContext::from_assignments(&args.vars)?;
    let vars = EnvFallback::new(&context, env);
    manifest::load(&args.manifest, &vars)
}

/// Maps a command outcome to the process exit code.
fn exit_code(outcome: CommandOutcome) -> ExitCode {
    match outcome {
        CommandOutcome::Success => ExitCode::SUCCESS,
        CommandOutcome::CommandExit { code } => ExitCode::from(u8::try_from(code).unwrap_or(1)),
    }
}
