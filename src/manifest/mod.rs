//! Pod manifest loading.
//!
//! A manifest goes through three steps, each of which can fail on its own:
//!
//! 1. [`template::resolve`] substitutes `{{ .key }}` placeholders in the raw
//!    text.
//! 2. The resolved text is parsed as YAML into a [`Manifest`].
//! 3. [`validate`] checks the structural invariants (at least one app, unique
//!    names, declared volumes, supported isolators).
//!
//! # Example Manifest
//!
//! ```yaml
//! __meta__:
//!   cli:
//!     net: rkt-bridge-1
//!   oneshot:
//!     unit_test: run_tests
//! apps:
//!   - image: registry.example.com/web:{{ .tag }}
//!     name: web
//!     app:
//!       exec: [/bin/web, --port, "8080"]
//!       ports:
//!         - name: http
//!           port: 8080
//!     mounts:
//!       - volume: data
//!         path: /var/lib/web
//! volumes:
//!   - name: data
//!     kind: host
//!     source: /srv/web
//! ```

mod model;
pub mod template;
mod validation;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

pub use model::{
    AppDetail, AppSpec, EnvVar, Isolator, IsolatorValue, Manifest, Meta, Mount, Port, VolumeSpec,
};
pub use template::{EnvFallback, RenderContext, VariableSource};
pub use validation::validate;

use crate::error::{ManifestError, Result};

/// Reads manifest text from disk.
///
/// Uses `cap_std::fs_utf8`, opening the parent directory with ambient
/// authority and reading the file from there.
///
/// # Errors
///
/// Returns `ManifestError::ReadFailed` if the directory or file cannot be read.
pub fn read(path: &Utf8Path) -> std::result::Result<String, ManifestError> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or(current_dir.as_path());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ManifestError::ReadFailed {
            path: path.to_owned(),
            message: e.to_string(),
        }
    })?;

    dir.read_to_string(file_name)
        .map_err(|e| ManifestError::ReadFailed {
            path: path.to_owned(),
            message: e.to_string(),
        })
}

/// Parses and validates already-resolved manifest text.
///
/// A document with no content (empty, only comments, or a YAML null) parses
/// as a manifest without apps and therefore fails validation.
///
/// # Errors
///
/// Returns `ManifestError::ParseFailed` for invalid YAML and any error from
/// [`validate`].
pub fn parse(resolved: &str) -> std::result::Result<Manifest, ManifestError> {
    let manifest = if is_blank_document(resolved) {
        Manifest::default()
    } else {
        serde_yaml::from_str::<Option<Manifest>>(resolved)
            .map_err(|e| ManifestError::ParseFailed {
                message: e.to_string(),
            })?
            .unwrap_or_default()
    };
    validate(&manifest)?;
    Ok(manifest)
}

/// Resolves placeholders in `text`, then parses and validates it.
///
/// # Errors
///
/// Returns `LaunchError::Template` if a placeholder cannot be resolved, or
/// `LaunchError::Manifest` if parsing or validation fails.
pub fn from_template(text: &str, vars: &dyn VariableSource) -> Result<Manifest> {
    let resolved = template::resolve(text, vars)?;
    let manifest = parse(&resolved)?;
    debug!(
        apps = manifest.apps.len(),
        volumes = manifest.volumes.len(),
        "manifest resolved"
    );
    Ok(manifest)
}

/// Reads, resolves, parses, and validates the manifest at `path`.
///
/// # Errors
///
/// Returns any error from [`read`] or [`from_template`].
pub fn load(path: &Utf8Path, vars: &dyn VariableSource) -> Result<Manifest> {
    debug!(%path, "loading manifest");
    let text = read(path)?;
    from_template(&text, vars)
}

fn is_blank_document(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}
