//! composer.json parser for PHP projects
//!
//! Handles:
//! - require.php constraint (e.g. `^8.2`, `>=8.1 <8.4`)

use crate::error::ManifestError;
use crate::manifest::{ManifestKind, ManifestParser};
use serde::Deserialize;
use std::collections::HashMap;

/// Parser for composer.json files
pub struct ComposerJsonParser;

#[derive(Deserialize)]
struct ComposerJson {
    #[serde(default)]
    require: Require,
}

/// `require` section; PHP encodes an empty one as `[]`
#[derive(Deserialize)]
#[serde(untagged)]
enum Require {
    Packages(HashMap<String, String>),
    Empty([(); 0]),
}

impl Default for Require {
    fn default() -> Self {
        Require::Empty([])
    }
}

impl Require {
    fn get(&self, package: &str) -> Option<&String> {
        match self {
            Require::Packages(packages) => packages.get(package),
            Require::Empty(_) => None,
        }
    }
}

impl ManifestParser for ComposerJsonParser {
    fn parse_version(&self, content: &str) -> Result<Option<String>, ManifestError> {
        let composer: ComposerJson = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error("composer.json", e.to_string()))?;

        Ok(composer
            .require
            .get("php")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::ComposerPhp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_php() {
        let content = r#"{"require": {"php": "^8.2", "laravel/framework": "^11.0"}}"#;
        assert_eq!(
            ComposerJsonParser.parse_version(content).unwrap(),
            Some("^8.2".to_string())
        );
    }

    #[test]
    fn test_no_php_requirement() {
        let content = r#"{"require": {"monolog/monolog": "^3.0"}}"#;
        assert_eq!(ComposerJsonParser.parse_version(content).unwrap(), None);
        assert_eq!(ComposerJsonParser.parse_version("{}").unwrap(), None);
    }

    #[test]
    fn test_empty_require_list() {
        let content = r#"{"name": "acme/app", "require": []}"#;
        assert_eq!(ComposerJsonParser.parse_version(content).unwrap(), None);
    }

    #[test]
    fn test_non_empty_require_list_is_error() {
        let err = ComposerJsonParser
            .parse_version(r#"{"require": ["php"]}"#)
            .unwrap_err();
        assert!(matches!(err, ManifestError::JsonParseError { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = ComposerJsonParser.parse_version("{\"require\": ").unwrap_err();
        assert!(matches!(err, ManifestError::JsonParseError { .. }));
    }
}
