//! Structural checks applied after parsing.

use std::collections::BTreeSet;

use super::model::Manifest;
use crate::compiler::SeccompMode;
use crate::error::ManifestError;

/// Validates a parsed manifest.
///
/// # Errors
///
/// Returns the first violation found:
/// - `ManifestError::NoApps` when `apps` is empty.
/// - `ManifestError::DuplicateApp` / `DuplicateVolume` for repeated names.
/// - `ManifestError::UndeclaredVolume` for mounts of unknown volumes.
/// - `ManifestError::UnsupportedIsolator` for isolators the compiler cannot
///   render.
pub fn validate(manifest: &Manifest) -> Result<(), ManifestError> {
    if manifest.apps.is_empty() {
        return Err(ManifestError::NoApps);
    }

    let mut volumes = BTreeSet::new();
    for volume in &manifest.volumes {
        if !volumes.insert(volume.name.as_str()) {
            return Err(ManifestError::DuplicateVolume {
                name: volume.name.clone(),
            });
        }
    }

    let mut apps = BTreeSet::new();
    for app in &manifest.apps {
        if !apps.insert(app.name.as_str()) {
            return Err(ManifestError::DuplicateApp {
                name: app.name.clone(),
            });
        }

        if let Some(mount) = app
            .mounts
            .iter()
            .find(|mount| !volumes.contains(mount.volume.as_str()))
        {
            return Err(ManifestError::UndeclaredVolume {
                app: app.name.clone(),
                volume: mount.volume.clone(),
            });
        }

        if let Some(isolator) = app
            .app
            .isolators
            .iter()
            .find(|isolator| SeccompMode::from_isolator_name(&isolator.name).is_none())
        {
            return Err(ManifestError::UnsupportedIsolator {
                app: app.name.clone(),
                isolator: isolator.name.clone(),
            });
        }
    }

    Ok(())
}
