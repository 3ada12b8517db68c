//! Per-invocation launch identifiers.
//!
//! One [`LaunchId`] is generated per invocation and threaded explicitly to
//! every place that names a resource: the service unit and the readiness
//! file. Sharing the token is what lets cleanup find exactly the unit and file
//! this invocation created.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use uuid::Uuid;

/// Default prefix for unit names and readiness files.
pub const DEFAULT_UNIT_PREFIX: &str = "rkt-launch";

/// A random token naming one invocation's resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LaunchId(String);

impl LaunchId {
    /// Generates a fresh random identifier (UUID v4, hex without dashes).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Uses a caller-chosen token, e.g. a fixed value in tests.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Service unit name: `<prefix>-<token>`.
    #[must_use]
    pub fn unit_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.0)
    }

    /// Readiness file path: `<dir>/<prefix>-<token>`.
    #[must_use]
    pub fn readiness_file(&self, dir: &Utf8Path, prefix: &str) -> Utf8PathBuf {
        dir.join(self.unit_name(prefix))
    }
}

impl fmt::Display for LaunchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
