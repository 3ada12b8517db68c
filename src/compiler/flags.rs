//! Tagged engine flags and their canonical ordering.
//!
//! Within a scope flags are ordered by flag name, and a stable sort keeps
//! repeated flags (two `--environment`, two `--mount`) in declaration order.
//! `--exec` is the one exception: it always comes last in its app because
//! positional arguments follow it.

use std::cmp::Ordering;

use super::layout::CommandText;

/// A pod-scope flag such as `--dns=host` or `--uuid-file-save=<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFlag {
    name: String,
    value: String,
}

impl MetaFlag {
    /// Creates `--<name>=<value>`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Flag name without leading dashes.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rendered `--<name>=<value>` word.
    #[must_use]
    pub fn render(&self) -> String {
        format!("--{}={}", self.name, self.value)
    }
}

/// Sorts meta flags by name; stable for equal names.
pub fn sort_meta_flags(flags: &mut [MetaFlag]) {
    flags.sort_by(|a, b| a.name.cmp(&b.name));
}

/// An app-scope flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppFlag {
    /// `--environment=NAME=value`
    Environment(String),
    /// `--mount=volume=<v>,target=<path>`
    Mount(String),
    /// `--name=<app>`
    Name(String),
    /// `--port=<name>:<port>`
    Port(String),
    /// `--seccomp=mode=<mode>,...`
    Seccomp(String),
    /// `--exec=<command>` followed by `-- <args>` and the `---` terminator.
    Exec {
        /// Executable inside the image.
        command: String,
        /// Positional arguments.
        args: Vec<String>,
    },
}

impl AppFlag {
    /// Flag name without leading dashes.
    #[must_use]
    pub const fn flag_name(&self) -> &'static str {
        match self {
            Self::Environment(_) => "environment",
            Self::Mount(_) => "mount",
            Self::Name(_) => "name",
            Self::Port(_) => "port",
            Self::Seccomp(_) => "seccomp",
            Self::Exec { .. } => "exec",
        }
    }

    /// Whether the flag must close its app regardless of name.
    const fn is_trailing(&self) -> bool {
        matches!(self, Self::Exec { .. })
    }

    /// Canonical comparator: trailing flags last, otherwise by flag name.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        (self.is_trailing(), self.flag_name()).cmp(&(other.is_trailing(), other.flag_name()))
    }

    /// Appends this flag's lines at `depth`.
    pub fn render_into(&self, text: &mut CommandText, depth: usize) {
        match self {
            Self::Environment(value)
            | Self::Mount(value)
            | Self::Name(value)
            | Self::Port(value)
            | Self::Seccomp(value) => {
                text.push_word(depth, &format!("--{}={value}", self.flag_name()));
            }
            Self::Exec { command, args } => {
                text.push_word(depth, &format!("--exec={command}"));
                let positional = std::iter::once("--").chain(args.iter().map(String::as_str));
                text.push_words(depth, positional);
                text.push_raw(depth, APP_TERMINATOR);
            }
        }
    }
}

/// Closes the positional arguments of an app's `--exec`.
pub const APP_TERMINATOR: &str = "---";

/// Sorts app flags canonically; stable for equal names.
pub fn sort_app_flags(flags: &mut [AppFlag]) {
    flags.sort_by(AppFlag::canonical_cmp);
}
