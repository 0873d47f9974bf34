//! Requested version specifications
//!
//! Handles version requests like:
//! - Exact: `1.2.3`, `1.2.3-beta.1`
//! - Release candidate: `1.22rc1`, `3.12.0rc1`, `8.3.0RC4`, `8.0.100-rc.1`
//! - Partial: `1.21`, `3`
//! - Constraint: `>=1.2.0`, `^3.11`, `1.25.*`, `1.2 - 1.3`, `<2 || >=3`

use crate::domain::Constraint;
use crate::error::VersionError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

// Three numeric components, optional pre-release (hyphen optional) and build metadata
static EXACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+\.\d+\.\d+)(?:-?([0-9A-Za-z][0-9A-Za-z.-]*))?(\+[0-9A-Za-z.-]+)?$").unwrap()
});
static RELEASE_CANDIDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d+\.\d+(?:\.\d+)?-?(?:rc|RC)\.?\d+$").unwrap());
static PARTIAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v?\d+(?:\.\d+)?$").unwrap());
// Used to skip unstable entries of an available set
static RC_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+.*(rc|RC)").unwrap());

/// The kind of version specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionSpecKind {
    /// Fully-qualified version, returned unchanged by resolution
    Exact,
    /// Release candidate such as `1.22rc1`, always exact
    ReleaseCandidate,
    /// Major or major.minor version acting as a wildcard (`1.21` matches `1.21.x`)
    Partial,
    /// Range constraint
    Constraint,
}

impl VersionSpecKind {
    /// Returns true if resolution bypasses the available set
    pub fn is_exact(&self) -> bool {
        matches!(
            self,
            VersionSpecKind::Exact | VersionSpecKind::ReleaseCandidate
        )
    }
}

/// A parsed version request, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    kind: VersionSpecKind,
    raw: String,
    normalized: String,
    constraint: Option<Constraint>,
}

impl VersionSpec {
    /// Parses a version request
    ///
    /// An empty string is the wildcard `*` (latest stable). An unparseable
    /// string is an error, never a silent default.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();

        if RELEASE_CANDIDATE_RE.is_match(raw) {
            let normalized = normalize_prerelease(raw.trim_start_matches('v'));
            semver::Version::parse(&coerce_version(&normalized))
                .map_err(|e| VersionError::invalid_spec(raw, e.to_string()))?;
            return Ok(Self {
                kind: VersionSpecKind::ReleaseCandidate,
                raw: raw.to_string(),
                normalized,
                constraint: None,
            });
        }

        if let Some(caps) = EXACT_RE.captures(raw) {
            let mut normalized = caps[1].to_string();
            if let Some(pre) = caps.get(2) {
                normalized.push('-');
                normalized.push_str(pre.as_str());
            }
            if let Some(build) = caps.get(3) {
                normalized.push_str(build.as_str());
            }
            // Leading zeros and empty identifiers fall through to constraint parsing
            if semver::Version::parse(&normalized).is_ok() {
                return Ok(Self {
                    kind: VersionSpecKind::Exact,
                    raw: raw.to_string(),
                    normalized,
                    constraint: None,
                });
            }
        }

        let kind = if PARTIAL_RE.is_match(raw) {
            VersionSpecKind::Partial
        } else {
            VersionSpecKind::Constraint
        };
        let constraint = Constraint::parse(raw)?;
        Ok(Self {
            kind,
            raw: raw.to_string(),
            normalized: constraint.normalized().to_string(),
            constraint: Some(constraint),
        })
    }

    /// Returns the kind of this spec
    pub fn kind(&self) -> VersionSpecKind {
        self.kind
    }

    /// Returns the spec exactly as requested (trimmed)
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the normalized form used for comparison
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Returns the constraint for non-exact specs
    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    /// Returns true if resolution returns this spec unchanged
    pub fn is_exact(&self) -> bool {
        self.kind.is_exact()
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{}", self.raw)
        }
    }
}

/// Inserts the hyphen semver requires before an `rc`/`RC` identifier
///
/// `1.22rc1` becomes `1.22-rc1` and `8.3.0RC4` becomes `8.3.0-RC4`.
pub fn normalize_prerelease(version: &str) -> String {
    let mut normalized = version.to_string();
    for marker in ["rc", "RC"] {
        let hyphenated = format!("-{}", marker);
        if normalized.contains(marker) && !normalized.contains(&hyphenated) {
            normalized = normalized.replacen(marker, &hyphenated, 1);
        }
    }
    normalized
}

/// Pads a partial version to three components for lenient parsing
///
/// A leading `v` is dropped; pre-release and build suffixes are kept.
pub fn coerce_version(version: &str) -> String {
    let trimmed = version.trim().trim_start_matches('v');
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(split_at);

    let mut parts: Vec<&str> = core.split('.').collect();
    while parts.len() < 3 {
        parts.push("0");
    }
    format!("{}{}", parts.join("."), rest)
}

/// Returns true if the string looks like a release candidate
pub fn is_release_candidate(version: &str) -> bool {
    RC_MARKER_RE.is_match(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact() {
        let spec = VersionSpec::parse("1.2.3").unwrap();
        assert_eq!(spec.kind(), VersionSpecKind::Exact);
        assert_eq!(spec.raw(), "1.2.3");
        assert!(spec.is_exact());
        assert!(spec.constraint().is_none());
    }

    #[test]
    fn test_parse_exact_with_prerelease() {
        let spec = VersionSpec::parse("1.2.3-beta.1").unwrap();
        assert_eq!(spec.kind(), VersionSpecKind::Exact);
        assert_eq!(spec.normalized(), "1.2.3-beta.1");

        let spec = VersionSpec::parse("1.2.3beta1").unwrap();
        assert_eq!(spec.kind(), VersionSpecKind::Exact);
        assert_eq!(spec.normalized(), "1.2.3-beta1");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let spec = VersionSpec::parse("  1.13.1 \n").unwrap();
        assert_eq!(spec.raw(), "1.13.1");
    }

    #[test]
    fn test_parse_release_candidates() {
        for (input, normalized) in [
            ("1.22rc1", "1.22-rc1"),
            ("3.12.0rc1", "3.12.0-rc1"),
            ("8.3.0RC4", "8.3.0-RC4"),
            ("8.0.100-rc.1", "8.0.100-rc.1"),
            ("3.2.0-rc1", "3.2.0-rc1"),
        ] {
            let spec = VersionSpec::parse(input).unwrap();
            assert_eq!(spec.kind(), VersionSpecKind::ReleaseCandidate, "{}", input);
            assert_eq!(spec.normalized(), normalized);
            assert_eq!(spec.raw(), input);
        }
    }

    #[test]
    fn test_parse_partial() {
        let spec = VersionSpec::parse("1.21").unwrap();
        assert_eq!(spec.kind(), VersionSpecKind::Partial);
        assert!(!spec.is_exact());
        let c = spec.constraint().unwrap();
        assert!(c.matches(&semver::Version::new(1, 21, 4)));
        assert!(!c.matches(&semver::Version::new(1, 22, 0)));
    }

    #[test]
    fn test_parse_constraint() {
        let spec = VersionSpec::parse(">=1.2.0").unwrap();
        assert_eq!(spec.kind(), VersionSpecKind::Constraint);
        assert!(spec.constraint().is_some());
    }

    #[test]
    fn test_parse_empty_is_wildcard() {
        let spec = VersionSpec::parse("").unwrap();
        assert_eq!(spec.kind(), VersionSpecKind::Constraint);
        assert_eq!(spec.normalized(), "*");
        assert_eq!(format!("{}", spec), "*");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(VersionSpec::parse("not-a-version").is_err());
        assert!(VersionSpec::parse(">>1.0").is_err());
        assert!(VersionSpec::parse("1.2.3.4.5").is_err());
    }

    #[test]
    fn test_normalize_prerelease() {
        assert_eq!(normalize_prerelease("1.22rc1"), "1.22-rc1");
        assert_eq!(normalize_prerelease("8.3.0RC4"), "8.3.0-RC4");
        assert_eq!(normalize_prerelease("3.2.0-rc1"), "3.2.0-rc1");
        assert_eq!(normalize_prerelease("1.2.3"), "1.2.3");
    }

    #[test]
    fn test_coerce_version() {
        assert_eq!(coerce_version("1.20"), "1.20.0");
        assert_eq!(coerce_version("1"), "1.0.0");
        assert_eq!(coerce_version("v1.2.3"), "1.2.3");
        assert_eq!(coerce_version("1.22-rc1"), "1.22.0-rc1");
        assert_eq!(coerce_version("1.2+build.5"), "1.2.0+build.5");
    }

    #[test]
    fn test_is_release_candidate() {
        assert!(is_release_candidate("3.12.0rc1"));
        assert!(is_release_candidate("8.0.100-rc.1"));
        assert!(is_release_candidate("8.3.0RC4"));
        assert!(is_release_candidate("1.22rc1"));
        assert!(!is_release_candidate("1.22.0"));
        assert!(!is_release_candidate("rc"));
    }

    #[test]
    fn test_spec_equality() {
        let a = VersionSpec::parse("^1.2").unwrap();
        let b = VersionSpec::parse("^1.2").unwrap();
        assert_eq!(a, b);
    }
}
