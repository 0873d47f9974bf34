//! Available versions published by a runtime index
//!
//! An [`AvailableVersionSet`] keeps the entries exactly as published and
//! remembers where they came from, so that a failed resolution can point the
//! user at the full list.

use crate::domain::{coerce_version, is_release_candidate};
use crate::error::VersionError;
use serde::{Deserialize, Serialize};

// Entries starting with these keywords are never installable
const SKIP_KEYWORDS: [&str; 3] = ["deprecated", "public-image", "latest"];

/// A single published version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableVersion {
    /// The version string as published (e.g., "1.20", "1.2.5")
    pub version: String,
    /// Whether the version is a stable release
    #[serde(default = "default_stable")]
    pub stable: bool,
}

fn default_stable() -> bool {
    true
}

impl AvailableVersion {
    /// Creates a new AvailableVersion
    pub fn new(version: impl Into<String>, stable: bool) -> Self {
        Self {
            version: version.into(),
            stable,
        }
    }

    /// Creates a stable AvailableVersion
    pub fn stable(version: impl Into<String>) -> Self {
        Self::new(version, true)
    }

    /// Returns true if the entry is excluded from resolution regardless of stability
    pub fn is_skipped(&self) -> bool {
        if is_release_candidate(&self.version) {
            return true;
        }
        let lower = self.version.to_ascii_lowercase();
        SKIP_KEYWORDS.iter().any(|k| lower.starts_with(k))
    }
}

/// A stable candidate ready for comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The string as published
    pub original: String,
    /// The zero-padded semver used for ordering
    pub version: semver::Version,
}

/// The set of versions a resolution may choose from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AvailableVersionSet {
    entries: Vec<AvailableVersion>,
    source: String,
}

impl AvailableVersionSet {
    /// Creates a set from explicit entries
    pub fn new(entries: Vec<AvailableVersion>, source: impl Into<String>) -> Self {
        Self {
            entries,
            source: source.into(),
        }
    }

    /// Creates a set where every entry is stable
    pub fn from_strings<I, S>(versions: I, source: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = versions.into_iter().map(AvailableVersion::stable).collect();
        Self::new(entries, source)
    }

    /// Returns the published entries
    pub fn entries(&self) -> &[AvailableVersion] {
        &self.entries
    }

    /// Returns where the set came from (URL or file path)
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns stable, non-skipped entries sorted from highest to lowest
    ///
    /// An entry that cannot be parsed as a version is an error rather than
    /// being silently ignored.
    pub fn stable_candidates(&self) -> Result<Vec<Candidate>, VersionError> {
        let mut candidates = Vec::new();
        for entry in self.entries.iter().filter(|e| e.stable && !e.is_skipped()) {
            let version = semver::Version::parse(&coerce_version(&entry.version)).map_err(|e| {
                VersionError::InvalidAvailableVersion {
                    version: entry.version.clone(),
                    source_name: self.source.clone(),
                    message: e.to_string(),
                }
            })?;
            candidates.push(Candidate {
                original: entry.version.clone(),
                version,
            });
        }

        candidates.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(candidates)
    }
}
