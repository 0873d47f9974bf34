//! Version resolution against published version indices
//!
//! This module provides:
//! - The resolver that picks the concrete version to install
//! - Discovery of the requested version from environment and manifests
//! - Range checks used for feature gates

mod discovery;

pub use discovery::{discover_version, RequestedVersion, VersionOrigin};

use crate::domain::{coerce_version, normalize_prerelease, AvailableVersionSet, VersionSpec};
use crate::error::VersionError;
use serde::Serialize;
use tracing::debug;

/// The concrete version chosen by a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    /// The version to install
    pub version: String,
    /// The index the version was picked from; `None` for exact requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ResolvedVersion {
    fn exact(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            source: None,
        }
    }
}

/// Picks the version to install for a request
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionResolver {
    /// Return the canonical `MAJOR.MINOR.PATCH` form instead of the published string
    sanitize: bool,
}

impl VersionResolver {
    /// Creates a resolver that returns versions exactly as published
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that returns zero-padded canonical versions
    pub fn sanitized() -> Self {
        Self { sanitize: true }
    }

    /// Resolves a request against the available set
    ///
    /// Exact and release-candidate requests are returned unchanged without
    /// consulting `available`. Everything else selects the highest stable
    /// entry satisfying the constraint.
    pub fn resolve(
        &self,
        spec: &VersionSpec,
        available: &AvailableVersionSet,
    ) -> Result<ResolvedVersion, VersionError> {
        let constraint = match spec.constraint() {
            Some(c) => c,
            None => {
                debug!(version = spec.raw(), "exact version requested, skipping index lookup");
                return Ok(ResolvedVersion::exact(spec.raw()));
            }
        };

        let candidates = available.stable_candidates()?;
        debug!(
            constraint = constraint.normalized(),
            source = available.source(),
            candidates = candidates.len(),
            "resolving version"
        );

        let chosen = candidates
            .into_iter()
            .find(|c| constraint.matches(&c.version))
            .ok_or_else(|| VersionError::no_match(spec.to_string(), available.source()))?;

        let version = if self.sanitize {
            chosen.version.to_string()
        } else {
            chosen.original
        };
        debug!(%version, "resolved version");

        Ok(ResolvedVersion {
            version,
            source: Some(available.source().to_string()),
        })
    }

    /// Parses the request then resolves it
    pub fn resolve_str(
        &self,
        spec: &str,
        available: &AvailableVersionSet,
    ) -> Result<ResolvedVersion, VersionError> {
        let spec = VersionSpec::parse(spec)?;
        self.resolve(&spec, available)
    }
}

/// Returns true if a concrete version satisfies a range
///
/// Release candidates are normalized first (`8.3.0RC4` is compared as `8.3.0-RC4`).
pub fn version_matches(range: &str, version: &str) -> Result<bool, VersionError> {
    let spec = VersionSpec::parse(range)?;
    let parsed = semver::Version::parse(&coerce_version(&normalize_prerelease(version)))
        .map_err(|e| VersionError::invalid_spec(version, e.to_string()))?;

    Ok(match spec.constraint() {
        Some(c) => c.matches(&parsed),
        None => semver::Version::parse(&coerce_version(spec.normalized()))
            .map(|exact| exact == parsed)
            .unwrap_or(false),
    })
}
