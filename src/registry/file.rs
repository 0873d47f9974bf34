//! Local index files
//!
//! Accepts the same shapes the remote indices publish, so a downloaded
//! index can be used offline:
//! - `[{"version": "1.2.3", "stable": true}]`
//! - `["1.2.3", "1.2.4"]`
//! - go.dev records (`"version": "go1.22.3"`)

use crate::domain::{AvailableVersion, AvailableVersionSet};
use crate::error::IndexError;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexEntry {
    Plain(String),
    Record(AvailableVersion),
}

/// Parses an index body into an available set
pub fn parse_index(body: Value, source: &str) -> Result<AvailableVersionSet, IndexError> {
    let entries: Vec<IndexEntry> = serde_json::from_value(body)
        .map_err(|e| IndexError::invalid_response(source, e.to_string()))?;

    let versions = entries
        .into_iter()
        .map(|entry| match entry {
            IndexEntry::Plain(version) => AvailableVersion::stable(version),
            IndexEntry::Record(mut record) => {
                if let Some(stripped) = record.version.strip_prefix("go") {
                    record.version = stripped.to_string();
                }
                record
            }
        })
        .collect();

    Ok(AvailableVersionSet::new(versions, source))
}

/// Loads an index from a JSON file
pub fn load_index_file(path: &Path) -> Result<AvailableVersionSet, IndexError> {
    let content = std::fs::read_to_string(path).map_err(|e| IndexError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let source = path.display().to_string();
    let body: Value = serde_json::from_str(&content)
        .map_err(|e| IndexError::invalid_response(&source, e.to_string()))?;
    parse_index(body, &source)
}
