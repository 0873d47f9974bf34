//! Discovery of the requested runtime version
//!
//! The request is taken from the first source that declares one:
//! 1. the language-specific variable (e.g. `GOOGLE_GO_VERSION`)
//! 2. `GOOGLE_RUNTIME_VERSION`
//! 3. the runtime's manifest (go.mod, .python-version, package.json, composer.json)
//! 4. the runtime's default constraint
//!
//! When `GOOGLE_RUNTIME` names a different runtime the request is `*`.

use crate::config::{BuildConfig, RuntimeOverride};
use crate::domain::Runtime;
use crate::error::ManifestError;
use crate::manifest::{read_declared_version, ManifestKind};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Where a requested version came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum VersionOrigin {
    /// An environment variable
    Env(String),
    /// A manifest declaration
    Manifest(ManifestKind),
    /// The runtime default
    Default,
    /// `GOOGLE_RUNTIME` targets another runtime
    OtherRuntime,
    /// Passed explicitly by the caller
    Argument,
}

impl fmt::Display for VersionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionOrigin::Env(var) => write!(f, "{}", var),
            VersionOrigin::Manifest(kind) => write!(f, "{}", kind.file_name()),
            VersionOrigin::Default => write!(f, "default"),
            VersionOrigin::OtherRuntime => write!(f, "GOOGLE_RUNTIME"),
            VersionOrigin::Argument => write!(f, "argument"),
        }
    }
}

/// A version request and its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestedVersion {
    pub value: String,
    pub origin: VersionOrigin,
}

impl RequestedVersion {
    pub fn new(value: impl Into<String>, origin: VersionOrigin) -> Self {
        Self {
            value: value.into(),
            origin,
        }
    }
}

/// Returns the manifest declaration that carries a runtime version
fn manifest_kind(runtime: Runtime) -> Option<ManifestKind> {
    match runtime {
        Runtime::Go => Some(ManifestKind::GoMod),
        Runtime::Python => Some(ManifestKind::PythonVersionFile),
        Runtime::Nodejs => Some(ManifestKind::NodeEngines),
        Runtime::Php => Some(ManifestKind::ComposerPhp),
        Runtime::Ruby => None,
    }
}

/// Discovers the version requested for a runtime
pub fn discover_version(
    runtime: Runtime,
    config: &BuildConfig,
    app_dir: &Path,
) -> Result<RequestedVersion, ManifestError> {
    if config.runtime_override(runtime) == Some(RuntimeOverride::OptOut) {
        return Ok(RequestedVersion::new("*", VersionOrigin::OtherRuntime));
    }

    if let Some((var, value)) = config.requested_version(runtime) {
        info!("Using {} version from {}: {}", runtime.display_name(), var, value);
        return Ok(RequestedVersion::new(value, VersionOrigin::Env(var.to_string())));
    }

    if let Some(kind) = manifest_kind(runtime) {
        let path = app_dir.join(kind.file_name());
        if let Some(value) = read_declared_version(&path, kind)? {
            info!("Using {} version from {}: {}", runtime.display_name(), kind.file_name(), value);
            return Ok(RequestedVersion::new(value, VersionOrigin::Manifest(kind)));
        }
    }

    let default = runtime.default_constraint();
    info!(
        "{} version not specified, using default constraint {}",
        runtime.display_name(),
        default
    );
    Ok(RequestedVersion::new(default, VersionOrigin::Default))
}
