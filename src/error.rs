//! Semantic error types for rkt-launch.
//!
//! Conditions a caller may want to inspect are modelled as `thiserror` enums.
//! Opaque reporting (`eyre::Report`) is reserved for the binary boundary.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised while substituting `{{ .key }}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder referenced a key the variable source does not define.
    #[error("template: manifest:{line}:{column}: map has no entry for key \"{key}\"")]
    MissingKey {
        /// The unresolved key, without the leading dot.
        key: String,
        /// One-based line of the placeholder.
        line: usize,
        /// One-based column of the placeholder.
        column: usize,
    },

    /// A `{{` was not closed or did not contain a `.key` reference.
    #[error("template: manifest:{line}:{column}: malformed placeholder {snippet:?}")]
    Malformed {
        /// The offending text, truncated to the end of its line.
        snippet: String,
        /// One-based line of the placeholder.
        line: usize,
        /// One-based column of the placeholder.
        column: usize,
    },
}

/// Errors raised while reading, parsing, or validating a pod manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest '{path}': {message}")]
    ReadFailed {
        /// The manifest path.
        path: Utf8PathBuf,
        /// A description of the I/O failure.
        message: String,
    },

    /// The resolved manifest text is not valid YAML for the manifest schema.
    #[error("failed to parse manifest: {message}")]
    ParseFailed {
        /// A description of the parse failure.
        message: String,
    },

    /// The manifest declares no apps.
    #[error("pod manifest must contain at least one app")]
    NoApps,

    /// Two apps share a name.
    #[error("app name '{name}' is declared more than once")]
    DuplicateApp {
        /// The repeated app name.
        name: String,
    },

    /// Two volumes share a name.
    #[error("volume '{name}' is declared more than once")]
    DuplicateVolume {
        /// The repeated volume name.
        name: String,
    },

    /// A mount references a volume missing from `volumes`.
    #[error("app '{app}' mounts undeclared volume '{volume}'")]
    UndeclaredVolume {
        /// The app carrying the mount.
        app: String,
        /// The missing volume name.
        volume: String,
    },

    /// An isolator name is neither a seccomp set nor a bare mode token.
    #[error("app '{app}' uses unsupported isolator '{isolator}'")]
    UnsupportedIsolator {
        /// The app carrying the isolator.
        app: String,
        /// The isolator name as written.
        isolator: String,
    },
}

/// Invalid combinations of caller-supplied arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// `oneshot` was invoked without `--app`.
    #[error("Must specify an --app")]
    MissingApp,

    /// `oneshot` was invoked with neither `--cmd` nor `--name`.
    #[error("Must specify either --cmd or --name")]
    MissingCommand,

    /// `oneshot` was invoked with both `--cmd` and `--name`.
    #[error("Can't specify both --cmd and --name options")]
    ConflictingCommand,

    /// `--name` does not appear in the manifest's oneshot table.
    #[error("no oneshot command named '{name}' in __meta__.oneshot")]
    UnknownOneshot {
        /// The requested oneshot name.
        name: String,
    },

    /// `--app` does not name an app in the manifest.
    #[error("manifest has no app named '{app}'")]
    UnknownApp {
        /// The requested app name.
        app: String,
    },

    /// A `--var` value is not of the form `KEY=VALUE`.
    #[error("invalid --var '{raw}': expected KEY=VALUE")]
    MalformedVariable {
        /// The value as supplied.
        raw: String,
    },
}

/// Errors raised while handing generated text to a child process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The shell could not be started.
    #[error("failed to spawn '{program}': {message}")]
    SpawnFailed {
        /// The program that failed to start.
        program: String,
        /// A description of the failure.
        message: String,
    },

    /// Generated text could not be written to the output stream.
    #[error("failed to write generated command: {message}")]
    OutputFailed {
        /// A description of the I/O failure.
        message: String,
    },

    /// The child finished without an exit code or signal.
    #[error("'{program}' finished without reporting an exit status")]
    NoExitStatus {
        /// The program that was run.
        program: String,
    },
}

/// Top-level error type for rkt-launch.
///
/// The binary converts this into an `eyre::Report` for display.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while resolving template placeholders.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// An error occurred while loading the manifest.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Caller-supplied arguments were inconsistent.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The generated command could not be executed.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// A specialised `Result` type for rkt-launch operations.
pub type Result<T> = std::result::Result<T, LaunchError>;
