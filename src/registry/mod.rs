//! Version index adapters for fetching available runtime versions
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - go.dev release index adapter
//! - Runtime version.json adapter (Node.js, PHP, Python, Ruby)
//! - Generic `{version, stable}` JSON index adapter
//! - Local index files

mod client;
mod file;
mod go_releases;
mod json_records;
mod runtime_versions;

pub use client::HttpClient;
pub use file::{load_index_file, parse_index};
pub use go_releases::GoReleaseIndex;
pub use json_records::JsonRecordIndex;
pub use runtime_versions::RuntimeVersionIndex;

use crate::domain::{AvailableVersionSet, Runtime};
use crate::error::IndexError;
use async_trait::async_trait;

/// Trait for available-version indices
#[async_trait]
pub trait VersionIndex: Send + Sync {
    /// Where the index is published, used in diagnostics
    fn source(&self) -> String;

    /// Fetch the available versions
    async fn fetch(&self) -> Result<AvailableVersionSet, IndexError>;
}

/// Create the index adapter publishing versions of a runtime
pub fn create_index(runtime: Runtime, client: HttpClient) -> Box<dyn VersionIndex> {
    match runtime {
        Runtime::Go => Box::new(GoReleaseIndex::new(client)),
        other => Box::new(RuntimeVersionIndex::new(other, client)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_index_sources() {
        let client = HttpClient::new().unwrap();
        assert_eq!(
            create_index(Runtime::Go, client.clone()).source(),
            "https://go.dev/dl/?mode=json"
        );
        assert_eq!(
            create_index(Runtime::Ruby, client).source(),
            "https://dl.google.com/runtimes/ruby/version.json"
        );
    }
}
