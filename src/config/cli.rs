//! Command-line argument definitions for rkt-launch.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::api::ExecutionMode;
use crate::oneshot::OneshotRequest;

/// Command-line interface for rkt-launch.
#[derive(Debug, Parser)]
#[command(name = "rkt-launch")]
#[command(
    author,
    version,
    about = "Compile pod manifests into rkt invocations and run oneshot commands inside them"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Program that receives the generated command; it is never written
    /// into the command text.
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub rkt: Option<String>,

    /// Print the generated command instead of running it.
    #[arg(long, global = true)]
    pub norun: bool,

    /// Print the generated command, then run it.
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Launch the pod described by a manifest.
    Up(UpArgs),

    /// Launch a pod, run one command inside an app, and tear the pod down.
    Oneshot(OneshotArgs),
}

/// Template inputs shared by every subcommand.
#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Template variable as `KEY=VALUE`; repeatable.
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Pod manifest path.
    #[arg(required = true)]
    pub manifest: Utf8PathBuf,
}

/// Arguments for the `up` subcommand.
#[derive(Debug, Parser)]
pub struct UpArgs {
    /// Run the pod inside a transient service unit.
    #[arg(long)]
    pub background: bool,

    /// Manifest and template variables.
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

/// Arguments for the `oneshot` subcommand.
#[derive(Debug, Parser)]
pub struct OneshotArgs {
    /// App to run the command in.
    #[arg(long)]
    pub app: Option<String>,

    /// Command to run inside the app.
    #[arg(long)]
    pub cmd: Option<String>,

    /// Name of a command listed under `__meta__.oneshot`.
    #[arg(long)]
    pub name: Option<String>,

    /// Manifest and template variables.
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

impl Cli {
    /// Execution mode selected by the global `--norun` and `--verbose` flags.
    #[must_use]
    pub const fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::from_flags(self.norun, self.verbose)
    }
}

impl From<&OneshotArgs> for OneshotRequest {
    fn from(args: &OneshotArgs) -> Self {
        Self {
            app: args.app.clone(),
            cmd: args.cmd.clone(),
            name: args.name.clone(),
        }
    }
}
