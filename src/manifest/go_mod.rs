//! go.mod parser for the Go toolchain version
//!
//! Reads the `go` directive with a small tokenizer instead of a regex:
//! a line must be exactly the keyword `go`, whitespace, and a version made of
//! two or three numeric components, optionally followed by a `//` comment.
//!
//! Handles:
//! - `go 1.13.1` -> `1.13.1`
//! - `go 1`, `go 1.13.`, `go1.13.1` -> no declared version
//! - several `go` directives -> the first one wins

use crate::error::ManifestError;
use crate::manifest::{ManifestKind, ManifestParser};

/// Parser for go.mod files
pub struct GoModParser;

impl ManifestParser for GoModParser {
    fn parse_version(&self, content: &str) -> Result<Option<String>, ManifestError> {
        Ok(content.lines().find_map(go_directive))
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::GoMod
    }
}

/// Returns the version of a `go` directive line, if the line is one
fn go_directive(line: &str) -> Option<String> {
    let code = match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    };

    let mut tokens = code.split_whitespace();
    if tokens.next()? != "go" {
        return None;
    }
    let version = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }

    is_numeric_version(version).then(|| version.to_string())
}

/// Two or three dot-separated, non-empty, all-digit components
fn is_numeric_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}
