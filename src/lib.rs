//! Compile pod manifests into `rkt` invocations.
//!
//! `rkt-launch` reads a YAML pod manifest, substitutes `{{ .key }}`
//! placeholders, and compiles the result into a deterministic, line-wrapped
//! `rkt run` command. The command can be printed, executed, or wrapped in a
//! transient `systemd-run` unit. The oneshot flow goes further: it launches the
//! pod, waits for it to report its UUID, runs one command inside an app with
//! `rkt enter`, and tears the pod down while preserving that command's exit
//! status.
//!
//! # Modules
//!
//! - [`api`]: Orchestration functions for `up` and `oneshot`
//! - [`compiler`]: Manifest to `rkt run` compilation and shell text layout
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Script execution through a shell
//! - [`error`]: Semantic error types for the application
//! - [`launch_id`]: Per-invocation identifiers for units and readiness files
//! - [`manifest`]: Manifest model, template resolution, and validation
//! - [`oneshot`]: Oneshot script stages and argument validation

pub mod api;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod launch_id;
pub mod manifest;
pub mod oneshot;
