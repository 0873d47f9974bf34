//! package.json parser for Node.js projects
//!
//! Handles:
//! - engines.node constraint
//! - packageManager field (`name@version`, e.g. `pnpm@9.0.0`)

use crate::error::ManifestError;
use crate::manifest::{ManifestKind, ManifestParser};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Parser for package.json version declarations
pub struct PackageJsonParser {
    kind: ManifestKind,
}

impl PackageJsonParser {
    /// Reads `engines.node`
    pub fn engines() -> Self {
        Self {
            kind: ManifestKind::NodeEngines,
        }
    }

    /// Reads `packageManager`
    pub fn package_manager() -> Self {
        Self {
            kind: ManifestKind::NodePackageManager,
        }
    }
}

/// The package manager pinned through the `packageManager` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManager {
    pub name: String,
    pub version: String,
}

impl ManifestParser for PackageJsonParser {
    fn parse_version(&self, content: &str) -> Result<Option<String>, ManifestError> {
        let json = parse_json(content)?;

        match self.kind {
            ManifestKind::NodePackageManager => {
                let field = string_field(&json, &["packageManager"])?;
                match field {
                    Some(value) => {
                        parse_package_manager(&value)?;
                        Ok(Some(value))
                    }
                    None => Ok(None),
                }
            }
            _ => string_field(&json, &["engines", "node"]),
        }
    }

    fn kind(&self) -> ManifestKind {
        self.kind
    }
}

/// Splits a `packageManager` value into name and version
///
/// The value must contain exactly one `@`.
pub fn parse_package_manager(value: &str) -> Result<PackageManager, ManifestError> {
    let parts: Vec<&str> = value.split('@').collect();
    match parts.as_slice() {
        [name, version] if !name.is_empty() && !version.is_empty() => Ok(PackageManager {
            name: name.to_string(),
            version: version.to_string(),
        }),
        _ => Err(ManifestError::invalid_version_spec(
            "package.json",
            value,
            "packageManager must have the form <name>@<version>",
        )),
    }
}

fn parse_json(content: &str) -> Result<Value, ManifestError> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| ManifestError::json_parse_error("package.json", e.to_string()))?;
    if !json.is_object() {
        return Err(ManifestError::JsonParseError {
            path: PathBuf::from("package.json"),
            message: "expected a JSON object".to_string(),
        });
    }
    Ok(json)
}

/// Reads a nested string field; an empty string counts as absent
fn string_field(json: &Value, keys: &[&str]) -> Result<Option<String>, ManifestError> {
    let mut current = json;
    for key in keys {
        match current.get(key) {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    match current {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        _ => Err(ManifestError::json_parse_error(
            "package.json",
            format!("{} must be a string", keys.join(".")),
        )),
    }
}
