//! Runtime catalogue for the supported language runtimes
//!
//! Each runtime knows:
//! - Its display name used in diagnostics
//! - The environment variable that pins its version
//! - The default constraint used when nothing is declared
//! - Where the list of available versions is published

use crate::error::{ConfigError, VersionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of Go releases published by go.dev
pub const GO_RELEASES_URL: &str = "https://go.dev/dl/?mode=json";

/// Template for runtime version indices hosted alongside the runtime tarballs
pub const RUNTIME_VERSIONS_URL: &str = "https://dl.google.com/runtimes/{runtime}/version.json";

/// Supported language runtimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    /// Go toolchain (go.mod)
    Go,
    /// Node.js (package.json)
    Nodejs,
    /// PHP (composer.json)
    Php,
    /// Python (pyproject.toml, .python-version)
    Python,
    /// Ruby (Gemfile)
    Ruby,
}

impl Runtime {
    /// Returns the runtime identifier used in URLs and runtime names
    pub fn id(&self) -> &'static str {
        match self {
            Runtime::Go => "go",
            Runtime::Nodejs => "nodejs",
            Runtime::Php => "php",
            Runtime::Python => "python",
            Runtime::Ruby => "ruby",
        }
    }

    /// Returns the display name for this runtime
    pub fn display_name(&self) -> &'static str {
        match self {
            Runtime::Go => "Go",
            Runtime::Nodejs => "Node.js",
            Runtime::Php => "PHP Runtime",
            Runtime::Python => "Python Runtime",
            Runtime::Ruby => "Ruby Runtime",
        }
    }

    /// Returns the language-specific environment variable that pins the version
    pub fn version_env(&self) -> &'static str {
        match self {
            Runtime::Go => "GOOGLE_GO_VERSION",
            Runtime::Nodejs => "GOOGLE_NODEJS_VERSION",
            Runtime::Php => "GOOGLE_PHP_VERSION",
            Runtime::Python => "GOOGLE_PYTHON_VERSION",
            Runtime::Ruby => "GOOGLE_RUBY_VERSION",
        }
    }

    /// Returns the constraint used when neither the environment nor a manifest declares one
    pub fn default_constraint(&self) -> &'static str {
        match self {
            Runtime::Go => "1.25.*",
            Runtime::Python => "3.14.*",
            Runtime::Nodejs | Runtime::Php | Runtime::Ruby => "*",
        }
    }

    /// Returns the URL of the available-versions index
    pub fn index_url(&self) -> String {
        match self {
            Runtime::Go => GO_RELEASES_URL.to_string(),
            other => RUNTIME_VERSIONS_URL.replace("{runtime}", other.id()),
        }
    }

    /// Returns the GAE / GCF runtime name for a concrete version
    ///
    /// `Runtime::Go.format_name("1.16.0")` returns `go116`.
    pub fn format_name(&self, version: &str) -> Result<String, VersionError> {
        format_name(self.id(), version)
    }

    /// Returns all supported runtimes
    pub fn all() -> &'static [Runtime] {
        &[
            Runtime::Go,
            Runtime::Nodejs,
            Runtime::Php,
            Runtime::Python,
            Runtime::Ruby,
        ]
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Runtime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" => Ok(Runtime::Go),
            "nodejs" | "node" => Ok(Runtime::Nodejs),
            "php" => Ok(Runtime::Php),
            "python" => Ok(Runtime::Python),
            "ruby" => Ok(Runtime::Ruby),
            _ => Err(ConfigError::UnknownRuntime {
                value: s.to_string(),
            }),
        }
    }
}

/// Formats a GAE / GCF runtime name from a language name and a concrete version
///
/// Node.js and .NET keep the major version, Java keeps the minor version and
/// everything else concatenates major and minor.
pub fn format_name(language: &str, version: &str) -> Result<String, VersionError> {
    let mut normalized = crate::domain::normalize_prerelease(version);
    if language == "java" {
        normalized = normalized.replacen('_', "+", 1);
    }

    let parsed = semver::Version::parse(&crate::domain::coerce_version(&normalized))
        .map_err(|e| VersionError::invalid_spec(version, e.to_string()))?;

    let suffix = match language {
        "java" => parsed.minor.to_string(),
        "dotnet" | "nodejs" => parsed.major.to_string(),
        _ => format!("{}{}", parsed.major, parsed.minor),
    };
    Ok(format!("{}{}", language, suffix))
}
