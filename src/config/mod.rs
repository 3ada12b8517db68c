//! Configuration system for rkt-launch.
//!
//! This module provides the configuration structures and CLI definitions for
//! the rkt-launch application. Configuration loading and precedence merging is
//! handled by the `ortho_config` crate: CLI flags override environment
//! variables, which override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/rkt-launch/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! log_filter = "rkt_launch=debug"
//!
//! [engine]
//! binary = "/usr/bin/rkt"
//! image_scheme = "docker"
//! shell = "/bin/sh"
//!
//! [service]
//! run = "systemd-run"
//! control = "systemctl"
//! unit_prefix = "rkt-launch"
//!
//! [oneshot]
//! state_dir = "/tmp"
//! poll_interval_ms = 200
//! privileged_enter = true
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{Cli, Commands, ManifestArgs, OneshotArgs, UpArgs};
pub use loader::{env_var_names, load_config};
pub use types::{AppConfig, EngineConfig, OneshotConfig, ServiceConfig};
