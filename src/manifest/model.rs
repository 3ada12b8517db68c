//! Typed pod manifest.
//!
//! Field order mirrors the YAML layout. Every list keeps its declaration
//! order; only `__meta__` tables are keyed maps.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A resolved pod manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Tool-level settings under `__meta__`.
    #[serde(rename = "__meta__", default)]
    pub meta: Meta,

    /// Apps launched together in one pod.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub apps: Vec<AppSpec>,

    /// Volumes available to app mounts.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub volumes: Vec<VolumeSpec>,
}

impl Manifest {
    /// Looks up an app by name.
    #[must_use]
    pub fn app(&self, name: &str) -> Option<&AppSpec> {
        self.apps.iter().find(|app| app.name == name)
    }

    /// Looks up a named oneshot command.
    #[must_use]
    pub fn oneshot(&self, name: &str) -> Option<&str> {
        self.meta.oneshot.get(name).map(String::as_str)
    }
}

/// The `__meta__` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Meta {
    /// Engine-level flags, rendered as `--<key>=<value>` before any app.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cli: BTreeMap<String, String>,

    /// Named commands for `oneshot --name`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub oneshot: BTreeMap<String, String>,
}

/// One app in the pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppSpec {
    /// Image reference without its transport scheme.
    pub image: String,

    /// App name, unique within the manifest.
    pub name: String,

    /// Runtime details.
    #[serde(default)]
    pub app: AppDetail,

    /// Volume mounts.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mounts: Vec<Mount>,

    /// Environment variables.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub environment: Vec<EnvVar>,
}

/// The `app` block of an [`AppSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppDetail {
    /// Command followed by its arguments.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exec: Vec<String>,

    /// Exposed ports.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ports: Vec<Port>,

    /// Security isolators.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub isolators: Vec<Isolator>,
}

/// A port exposed by an app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Port {
    /// Optional port name, e.g. `1111-tcp`.
    #[serde(default)]
    pub name: Option<String>,

    /// Port number.
    pub port: u16,
}

/// A named isolator attached to an app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Isolator {
    /// Either `os/linux/seccomp-<mode>-set` or a bare mode such as `retain`.
    pub name: String,

    /// Syscall set and optional errno.
    #[serde(default)]
    pub value: IsolatorValue,
}

/// Payload of an [`Isolator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IsolatorValue {
    /// Syscalls or syscall groups.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub set: Vec<String>,

    /// Errno returned for filtered syscalls.
    #[serde(default)]
    pub errno: Option<String>,
}

/// A volume mounted into an app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mount {
    /// Name of a declared volume.
    pub volume: String,

    /// Target path inside the app.
    pub path: String,
}

/// An environment variable for an app.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,

    /// Variable value.
    pub value: String,
}

/// A pod-level volume.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VolumeSpec {
    /// Volume name referenced by mounts.
    pub name: String,

    /// Volume kind, e.g. `host` or `empty`.
    pub kind: String,

    /// Source path on the host.
    pub source: String,
}

/// Treats an explicit YAML `null` (`apps:` with nothing after it) as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
