//! .python-version parser
//!
//! The first non-comment line is the requested version. A file that exists
//! but declares nothing is a user error rather than an absent declaration.

use crate::error::ManifestError;
use crate::manifest::{ManifestKind, ManifestParser};
use std::path::PathBuf;

/// Parser for .python-version files
pub struct PythonVersionParser;

impl ManifestParser for PythonVersionParser {
    fn parse_version(&self, content: &str) -> Result<Option<String>, ManifestError> {
        content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| Some(line.to_string()))
            .ok_or_else(|| ManifestError::EmptyVersionFile {
                path: PathBuf::from(".python-version"),
            })
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::PythonVersionFile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(
            PythonVersionParser.parse_version("3.12.1\n").unwrap(),
            Some("3.12.1".to_string())
        );
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let content = "# pinned for prod\n\n  3.11 \n3.10\n";
        assert_eq!(
            PythonVersionParser.parse_version(content).unwrap(),
            Some("3.11".to_string())
        );
    }

    #[test]
    fn test_empty_file_is_error() {
        let err = PythonVersionParser.parse_version("  \n\n").unwrap_err();
        assert!(matches!(err, ManifestError::EmptyVersionFile { .. }));
    }
}
