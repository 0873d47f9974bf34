//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Malformed version specs and unsatisfiable constraints
//! - ManifestError: Issues reading or parsing version declarations
//! - IndexError: Issues fetching or decoding available-version indices
//! - RenderError: Issues rendering web server configuration
//! - ConfigError: Issues with build configuration from the environment
//!
//! Every error maps onto an [`ErrorKind`] so callers can tell bad input apart
//! from a constraint that simply has no match.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse classification of failures surfaced to build steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed version spec, manifest, template id or configuration
    InvalidInput,
    /// Constraint unsatisfiable against the available set
    NoMatchingVersion,
    /// File system failure
    Io,
    /// Remote index could not be fetched
    Network,
}

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Version resolution errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Version index related errors
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Config rendering errors
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Build configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO related errors
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while parsing version specs or resolving them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The requested version or constraint cannot be parsed
    #[error("invalid version specification '{spec}': {message}")]
    InvalidVersionSpec { spec: String, message: String },

    /// An entry of the available set cannot be parsed as a version
    #[error("failed to parse version '{version}' from {source_name}: {message}")]
    InvalidAvailableVersion {
        version: String,
        source_name: String,
        message: String,
    },

    /// No stable entry satisfies the constraint
    #[error(
        "no stable version matches '{constraint}', see {source_name} for the list of available versions"
    )]
    NoMatchingVersion {
        constraint: String,
        source_name: String,
    },
}

/// Errors related to reading declared versions from manifest files
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error (package.json, composer.json)
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// TOML parsing error (pyproject.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// YAML parsing error (app.yaml)
    #[error("failed to parse YAML in {path}: {message}")]
    YamlParseError { path: PathBuf, message: String },

    /// A version file exists but does not declare anything
    #[error("{path} exists but does not specify a version")]
    EmptyVersionFile { path: PathBuf },

    /// A declared version is present but malformed
    #[error("invalid version specification '{spec}' in {path}: {message}")]
    InvalidVersionSpec {
        path: PathBuf,
        spec: String,
        message: String,
    },

    /// The file name does not map onto a known manifest
    #[error("unsupported manifest format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Errors related to fetching available-version indices
#[derive(Error, Debug)]
pub enum IndexError {
    /// Resource not found
    #[error("version index not found at {url}")]
    NotFound { url: String },

    /// Network request failed
    #[error("failed to fetch version index {url}: {message}")]
    NetworkError { url: String, message: String },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {url}")]
    RateLimitExceeded { url: String },

    /// Invalid response body
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// Timeout
    #[error("timeout while fetching {url}")]
    Timeout { url: String },

    /// Local index file could not be read
    #[error("failed to read version index file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to rendering configuration templates
#[derive(Error, Debug)]
pub enum RenderError {
    /// The template id is not part of the closed template set
    #[error("unknown template '{name}': expected one of {expected}")]
    UnknownTemplate { name: String, expected: String },

    /// Template engine failure
    #[error("failed to render template '{template}': {message}")]
    Template { template: String, message: String },

    /// Rendered output could not be written
    #[error("failed to write rendered config {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to build configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Boolean variable with an unparseable value
    #[error("invalid boolean value '{value}' for {var}")]
    InvalidBool { var: String, value: String },

    /// Unknown runtime name
    #[error("unknown runtime '{value}': expected 'go', 'nodejs', 'php', 'python', or 'ruby'")]
    UnknownRuntime { value: String },

    /// Unknown Python package manager
    #[error("unknown Python package manager '{value}' in {var}: expected 'pip', 'uv', or 'poetry'")]
    UnknownInstaller { var: String, value: String },
}

impl AppError {
    /// Creates a new Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Version(e) => e.kind(),
            AppError::Manifest(e) => e.kind(),
            AppError::Index(e) => e.kind(),
            AppError::Render(e) => e.kind(),
            AppError::Config(_) => ErrorKind::InvalidInput,
            AppError::Io { .. } => ErrorKind::Io,
        }
    }
}

impl VersionError {
    /// Creates a new InvalidVersionSpec error
    pub fn invalid_spec(spec: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::InvalidVersionSpec {
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Creates a new NoMatchingVersion error
    pub fn no_match(constraint: impl Into<String>, source_name: impl Into<String>) -> Self {
        VersionError::NoMatchingVersion {
            constraint: constraint.into(),
            source_name: source_name.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VersionError::InvalidVersionSpec { .. } | VersionError::InvalidAvailableVersion { .. } => {
                ErrorKind::InvalidInput
            }
            VersionError::NoMatchingVersion { .. } => ErrorKind::NoMatchingVersion,
        }
    }
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new YamlParseError
    pub fn yaml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::YamlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidVersionSpec error
    pub fn invalid_version_spec(
        path: impl Into<PathBuf>,
        spec: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::InvalidVersionSpec {
            path: path.into(),
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Points a content-level error at the file that was read
    pub fn with_path(self, file: &Path) -> Self {
        let file = file.to_path_buf();
        match self {
            ManifestError::JsonParseError { message, .. } => ManifestError::JsonParseError { path: file, message },
            ManifestError::TomlParseError { message, .. } => ManifestError::TomlParseError { path: file, message },
            ManifestError::YamlParseError { message, .. } => ManifestError::YamlParseError { path: file, message },
            ManifestError::EmptyVersionFile { .. } => ManifestError::EmptyVersionFile { path: file },
            ManifestError::InvalidVersionSpec { spec, message, .. } => ManifestError::InvalidVersionSpec {
                path: file,
                spec,
                message,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ManifestError::ReadError { .. } => ErrorKind::Io,
            _ => ErrorKind::InvalidInput,
        }
    }
}

impl IndexError {
    /// Creates a new NetworkError
    pub fn network_error(url: impl Into<String>, message: impl Into<String>) -> Self {
        IndexError::NetworkError {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(url: impl Into<String>, message: impl Into<String>) -> Self {
        IndexError::InvalidResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(url: impl Into<String>) -> Self {
        IndexError::Timeout { url: url.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexError::ReadError { .. } => ErrorKind::Io,
            IndexError::InvalidResponse { .. } => ErrorKind::InvalidInput,
            _ => ErrorKind::Network,
        }
    }
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::WriteError { .. } => ErrorKind::Io,
            _ => ErrorKind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_error_invalid_spec() {
        let err = VersionError::invalid_spec(">>1.0", "unexpected operator");
        let msg = format!("{}", err);
        assert!(msg.contains("invalid version specification"));
        assert!(msg.contains(">>1.0"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_version_error_no_match_points_to_source() {
        let err = VersionError::no_match(">=9.9.9", "https://go.dev/dl/?mode=json");
        let msg = format!("{}", err);
        assert!(msg.contains(">=9.9.9"));
        assert!(msg.contains("https://go.dev/dl/?mode=json"));
        assert_eq!(err.kind(), ErrorKind::NoMatchingVersion);
    }

    #[test]
    fn test_manifest_error_toml_parse() {
        let err = ManifestError::toml_parse_error("/app/pyproject.toml", "invalid key");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse TOML"));
        assert!(msg.contains("invalid key"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_manifest_error_empty_version_file() {
        let err = ManifestError::EmptyVersionFile {
            path: PathBuf::from("/app/.python-version"),
        };
        assert!(format!("{}", err).contains("does not specify a version"));
    }

    #[test]
    fn test_manifest_error_with_path() {
        let err = ManifestError::json_parse_error("package.json", "expected value")
            .with_path(Path::new("/app/sub/package.json"));
        assert!(format!("{}", err).contains("failed to parse JSON in /app/sub/package.json"));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ManifestError::read_error("/app/go.mod", io).with_path(Path::new("/other"));
        assert!(format!("{}", err).contains("/app/go.mod"));
    }

    #[test]
    fn test_manifest_error_read_is_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ManifestError::read_error("/app/go.mod", io);
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_index_error_timeout() {
        let err = IndexError::timeout("https://example.com/versions.json");
        let msg = format!("{}", err);
        assert!(msg.contains("timeout"));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_render_error_unknown_template() {
        let err = RenderError::UnknownTemplate {
            name: "apache".to_string(),
            expected: "nginx-server".to_string(),
        };
        assert!(format!("{}", err).contains("unknown template 'apache'"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_config_error_unknown_installer() {
        let err = ConfigError::UnknownInstaller {
            var: "GOOGLE_PYTHON_PACKAGE_MANAGER".to_string(),
            value: "conda".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("conda"));
        assert!(msg.contains("GOOGLE_PYTHON_PACKAGE_MANAGER"));
    }

    #[test]
    fn test_app_error_from_version_error_keeps_kind() {
        let app_err: AppError = VersionError::no_match("1.2", "index.json").into();
        assert_eq!(app_err.kind(), ErrorKind::NoMatchingVersion);
        assert!(format!("{}", app_err).contains("no stable version matches"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::UnknownRuntime {
            value: "cobol".to_string(),
        }
        .into();
        assert_eq!(app_err.kind(), ErrorKind::InvalidInput);
    }
}
