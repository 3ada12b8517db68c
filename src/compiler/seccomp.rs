//! Seccomp isolator compilation.

use crate::manifest::Isolator;

const SECCOMP_MARKER: &str = "seccomp-";
const SET_SUFFIX: &str = "-set";

/// The seccomp mode named by an isolator, e.g. `retain` or `remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeccompMode(String);

impl SeccompMode {
    /// Extracts the mode from an isolator name.
    ///
    /// Accepts the engine-qualified form `os/linux/seccomp-<mode>-set` and a
    /// bare mode token such as `retain`. Any other path-like name yields
    /// `None`.
    #[must_use]
    pub fn from_isolator_name(name: &str) -> Option<Self> {
        if let Some(idx) = name.rfind(SECCOMP_MARKER) {
            let mode = name
                .get(idx + SECCOMP_MARKER.len()..)?
                .strip_suffix(SET_SUFFIX)?;
            return is_mode_token(mode).then(|| Self(mode.to_owned()));
        }
        is_mode_token(name).then(|| Self(name.to_owned()))
    }

    /// The mode token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_mode_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Renders the `--seccomp` value for an isolator:
/// `mode=<mode>,<set...>[,errno=<errno>]`.
///
/// Returns `None` when the isolator name is not a seccomp isolator.
#[must_use]
pub fn seccomp_value(isolator: &Isolator) -> Option<String> {
    let mode = SeccompMode::from_isolator_name(&isolator.name)?;
    let mut parts = Vec::with_capacity(isolator.value.set.len() + 2);
    parts.push(format!("mode={}", mode.as_str()));
    parts.extend(isolator.value.set.iter().cloned());
    if let Some(errno) = isolator.value.errno.as_deref().filter(|e| !e.is_empty()) {
        parts.push(format!("errno={errno}"));
    }
    Some(parts.join(","))
}
