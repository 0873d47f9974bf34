//! pyproject.toml parser for Python tool requirements
//!
//! Handles:
//! - tool.poetry.requires-poetry (Poetry 2.x)
//! - tool.uv.required-version (uv)
//!
//! The value is a PEP 440 specifier set such as `>=2.0,<3.0`; it is appended
//! to the tool name when the tool is installed (`poetry>=2.0,<3.0`).

use crate::error::ManifestError;
use crate::manifest::{ManifestKind, ManifestParser};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use toml::Table;

// One PEP 440 clause: optional operator, numeric release, optional wildcard or suffix
static PEP440_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(===|==|!=|~=|<=|>=|<|>)?\s*v?\d+(\.\d+)*(\.\*|[a-zA-Z0-9.+-]*)$").unwrap()
});

/// Parser for pyproject.toml tool requirements
pub struct PyprojectTomlParser {
    kind: ManifestKind,
}

impl PyprojectTomlParser {
    /// Reads `tool.poetry.requires-poetry`
    pub fn poetry() -> Self {
        Self {
            kind: ManifestKind::PoetryRequirement,
        }
    }

    /// Reads `tool.uv.required-version`
    pub fn uv() -> Self {
        Self {
            kind: ManifestKind::UvRequirement,
        }
    }

    fn key_path(&self) -> [&'static str; 3] {
        match self.kind {
            ManifestKind::UvRequirement => ["tool", "uv", "required-version"],
            _ => ["tool", "poetry", "requires-poetry"],
        }
    }
}

impl ManifestParser for PyprojectTomlParser {
    fn parse_version(&self, content: &str) -> Result<Option<String>, ManifestError> {
        let toml: Table =
            toml::from_str(content).map_err(|e: toml::de::Error| ManifestError::TomlParseError {
                path: PathBuf::from("pyproject.toml"),
                message: e.to_string(),
            })?;

        let [section, tool, key] = self.key_path();
        let value = match toml
            .get(section)
            .and_then(|t| t.get(tool))
            .and_then(|t| t.get(key))
        {
            Some(value) => value,
            None => return Ok(None),
        };

        let spec = value.as_str().ok_or_else(|| {
            ManifestError::toml_parse_error(
                "pyproject.toml",
                format!("{}.{}.{} must be a string", section, tool, key),
            )
        })?;

        let spec = spec.trim();
        if spec.is_empty() {
            return Ok(None);
        }
        validate_specifier(spec)?;
        Ok(Some(spec.to_string()))
    }

    fn kind(&self) -> ManifestKind {
        self.kind
    }
}

/// Checks that every comma-separated clause is a PEP 440 version specifier
fn validate_specifier(spec: &str) -> Result<(), ManifestError> {
    for clause in spec.split(',') {
        let clause = clause.trim();
        if !PEP440_CLAUSE_RE.is_match(clause) {
            return Err(ManifestError::invalid_version_spec(
                "pyproject.toml",
                spec,
                format!("'{}' is not a valid version specifier", clause),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poetry(content: &str) -> Result<Option<String>, ManifestError> {
        PyprojectTomlParser::poetry().parse_version(content)
    }

    fn uv(content: &str) -> Result<Option<String>, ManifestError> {
        PyprojectTomlParser::uv().parse_version(content)
    }

    #[test]
    fn test_requires_poetry() {
        let content = r#"
[tool.poetry]
requires-poetry = ">=2.0,<3.0"
package-mode = false
"#;
        assert_eq!(poetry(content).unwrap(), Some(">=2.0,<3.0".to_string()));
    }

    #[test]
    fn test_uv_required_version() {
        let content = r#"
[project]
name = "app"

[tool.uv]
required-version = "==0.5.11"
"#;
        assert_eq!(uv(content).unwrap(), Some("==0.5.11".to_string()));
    }

    #[test]
    fn test_missing_section_is_absent() {
        let content = "[project]\nname = \"app\"\n";
        assert_eq!(poetry(content).unwrap(), None);
        assert_eq!(uv(content).unwrap(), None);
    }

    #[test]
    fn test_tool_without_key_is_absent() {
        let content = "[tool.poetry]\nname = \"app\"\n";
        assert_eq!(poetry(content).unwrap(), None);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let content = "[tool.uv]\nrequired-version = \"\"\n";
        assert_eq!(uv(content).unwrap(), None);
    }

    #[test]
    fn test_compatible_release_and_wildcard() {
        let content = "[tool.poetry]\nrequires-poetry = \"~=1.8\"\n";
        assert_eq!(poetry(content).unwrap(), Some("~=1.8".to_string()));

        let content = "[tool.poetry]\nrequires-poetry = \"==2.1.*\"\n";
        assert_eq!(poetry(content).unwrap(), Some("==2.1.*".to_string()));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = poetry("[tool.poetry\nrequires-poetry = 1").unwrap_err();
        assert!(matches!(err, ManifestError::TomlParseError { .. }));
    }

    #[test]
    fn test_non_string_value_is_error() {
        let err = poetry("[tool.poetry]\nrequires-poetry = 2\n").unwrap_err();
        assert!(matches!(err, ManifestError::TomlParseError { .. }));
    }

    #[test]
    fn test_malformed_specifier_is_error() {
        let err = poetry("[tool.poetry]\nrequires-poetry = \">=two\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidVersionSpec { .. }));

        let err = uv("[tool.uv]\nrequired-version = \">=0.5,\"\n").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidVersionSpec { .. }));
    }
}
