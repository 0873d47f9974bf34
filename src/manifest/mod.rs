//! Declared version extraction from manifest files
//!
//! This module provides functionality to:
//! - Read the Go toolchain version from go.mod
//! - Read Poetry/uv tool constraints from pyproject.toml
//! - Read the Python version from .python-version
//! - Read engines/packageManager from package.json
//! - Read the PHP constraint from composer.json
//! - Read runtime_config overrides from app.yaml
//!
//! An absent declaration is `Ok(None)`; a malformed manifest is an error.

mod app_yaml;
mod composer_json;
mod go_mod;
mod package_json;
mod pyproject_toml;
mod python_version;

pub use app_yaml::{load_app_yaml, runtime_config_from_env};
pub use composer_json::ComposerJsonParser;
pub use go_mod::GoModParser;
pub use package_json::{parse_package_manager, PackageJsonParser, PackageManager};
pub use pyproject_toml::PyprojectTomlParser;
pub use python_version::PythonVersionParser;

use crate::error::ManifestError;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// A version declaration inside a manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestKind {
    /// `go` directive of go.mod
    GoMod,
    /// `tool.poetry.requires-poetry` of pyproject.toml
    PoetryRequirement,
    /// `tool.uv.required-version` of pyproject.toml
    UvRequirement,
    /// Contents of .python-version
    PythonVersionFile,
    /// `engines.node` of package.json
    NodeEngines,
    /// `packageManager` of package.json
    NodePackageManager,
    /// `require.php` of composer.json
    ComposerPhp,
}

impl ManifestKind {
    /// Returns the file name holding this declaration
    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::GoMod => "go.mod",
            ManifestKind::PoetryRequirement | ManifestKind::UvRequirement => "pyproject.toml",
            ManifestKind::PythonVersionFile => ".python-version",
            ManifestKind::NodeEngines | ManifestKind::NodePackageManager => "package.json",
            ManifestKind::ComposerPhp => "composer.json",
        }
    }

    /// Returns the identifier accepted on the command line
    pub fn id(&self) -> &'static str {
        match self {
            ManifestKind::GoMod => "go-mod",
            ManifestKind::PoetryRequirement => "poetry-requirement",
            ManifestKind::UvRequirement => "uv-requirement",
            ManifestKind::PythonVersionFile => "python-version-file",
            ManifestKind::NodeEngines => "node-engines",
            ManifestKind::NodePackageManager => "node-package-manager",
            ManifestKind::ComposerPhp => "composer-php",
        }
    }

    /// Detects the declaration to read from a file name
    ///
    /// pyproject.toml defaults to the Poetry requirement and package.json to
    /// `engines.node`.
    pub fn detect(path: &Path) -> Result<Self, ManifestError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        match name {
            "go.mod" => Ok(ManifestKind::GoMod),
            "pyproject.toml" => Ok(ManifestKind::PoetryRequirement),
            ".python-version" => Ok(ManifestKind::PythonVersionFile),
            "package.json" => Ok(ManifestKind::NodeEngines),
            "composer.json" => Ok(ManifestKind::ComposerPhp),
            _ => Err(ManifestError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Returns all declaration kinds
    pub fn all() -> &'static [ManifestKind] {
        &[
            ManifestKind::GoMod,
            ManifestKind::PoetryRequirement,
            ManifestKind::UvRequirement,
            ManifestKind::PythonVersionFile,
            ManifestKind::NodeEngines,
            ManifestKind::NodePackageManager,
            ManifestKind::ComposerPhp,
        ]
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for ManifestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ManifestKind::all()
            .iter()
            .find(|k| k.id() == s)
            .copied()
            .ok_or_else(|| {
                let expected: Vec<&str> = ManifestKind::all().iter().map(|k| k.id()).collect();
                format!("unknown manifest kind '{}': expected one of {}", s, expected.join(", "))
            })
    }
}

/// Trait for reading a declared version from manifest content
pub trait ManifestParser {
    /// Returns the declared version, `None` when the manifest declares nothing
    fn parse_version(&self, content: &str) -> Result<Option<String>, ManifestError>;

    /// Returns the declaration this parser reads
    fn kind(&self) -> ManifestKind;
}

/// Get a manifest parser for the specified declaration
pub fn get_parser(kind: ManifestKind) -> Box<dyn ManifestParser> {
    match kind {
        ManifestKind::GoMod => Box::new(GoModParser),
        ManifestKind::PoetryRequirement => Box::new(PyprojectTomlParser::poetry()),
        ManifestKind::UvRequirement => Box::new(PyprojectTomlParser::uv()),
        ManifestKind::PythonVersionFile => Box::new(PythonVersionParser),
        ManifestKind::NodeEngines => Box::new(PackageJsonParser::engines()),
        ManifestKind::NodePackageManager => Box::new(PackageJsonParser::package_manager()),
        ManifestKind::ComposerPhp => Box::new(ComposerJsonParser),
    }
}

/// Reads a declared version from a manifest file
///
/// A missing file is `Ok(None)`, the same as a file that declares nothing.
pub fn read_declared_version(
    path: &Path,
    kind: ManifestKind,
) -> Result<Option<String>, ManifestError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "manifest not found");
            return Ok(None);
        }
        Err(e) => return Err(ManifestError::read_error(path, e)),
    };

    let version = get_parser(kind)
        .parse_version(&content)
        .map_err(|e| e.with_path(path))?;
    debug!(path = %path.display(), %kind, ?version, "read declared version");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_get_parser_kinds() {
        for kind in ManifestKind::all() {
            assert_eq!(get_parser(*kind).kind(), *kind);
        }
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            ManifestKind::detect(Path::new("/app/go.mod")).unwrap(),
            ManifestKind::GoMod
        );
        assert_eq!(
            ManifestKind::detect(Path::new("pyproject.toml")).unwrap(),
            ManifestKind::PoetryRequirement
        );
        assert_eq!(
            ManifestKind::detect(Path::new(".python-version")).unwrap(),
            ManifestKind::PythonVersionFile
        );
        assert!(ManifestKind::detect(&PathBuf::from("Cargo.toml")).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "uv-requirement".parse::<ManifestKind>().unwrap(),
            ManifestKind::UvRequirement
        );
        let err = "gemfile".parse::<ManifestKind>().unwrap_err();
        assert!(err.contains("go-mod"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(ManifestKind::UvRequirement.file_name(), "pyproject.toml");
        assert_eq!(ManifestKind::NodePackageManager.file_name(), "package.json");
    }

    #[test]
    fn test_read_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("go.mod");
        assert_eq!(read_declared_version(&path, ManifestKind::GoMod).unwrap(), None);
    }

    #[test]
    fn test_read_declared_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("go.mod");
        std::fs::write(&path, "module example.com/app\n\ngo 1.22.1\n").unwrap();
        assert_eq!(
            read_declared_version(&path, ManifestKind::GoMod).unwrap(),
            Some("1.22.1".to_string())
        );
    }

    #[test]
    fn test_read_error_names_the_file_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let path = dir.path().join("sub").join("package.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_declared_version(&path, ManifestKind::NodeEngines).unwrap_err();
        assert!(matches!(err, ManifestError::JsonParseError { .. }));
        assert!(format!("{}", err).contains(&path.display().to_string()));

        let path = dir.path().join(".python-version");
        std::fs::write(&path, "# comment only\n").unwrap();
        let err = read_declared_version(&path, ManifestKind::PythonVersionFile).unwrap_err();
        assert!(format!("{}", err).contains(&path.display().to_string()));
    }
}
