//! Runtime version.json adapter
//!
//! Fetches the versions published alongside runtime tarballs.
//! API endpoint:
//! - https://dl.google.com/runtimes/{runtime}/version.json
//!
//! The body is a JSON array of version strings, all of them stable.

use crate::domain::{AvailableVersionSet, Runtime};
use crate::error::IndexError;
use crate::registry::{HttpClient, VersionIndex};
use async_trait::async_trait;

/// Runtime version.json adapter
pub struct RuntimeVersionIndex {
    client: HttpClient,
    url: String,
}

impl RuntimeVersionIndex {
    /// Create a new adapter for a runtime
    pub fn new(runtime: Runtime, client: HttpClient) -> Self {
        Self {
            client,
            url: runtime.index_url(),
        }
    }
}

#[async_trait]
impl VersionIndex for RuntimeVersionIndex {
    fn source(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<AvailableVersionSet, IndexError> {
        let versions: Vec<String> = self.client.get_json(&self.url).await?;
        Ok(AvailableVersionSet::from_strings(versions, self.url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_per_runtime() {
        let client = HttpClient::new().unwrap();
        let index = RuntimeVersionIndex::new(Runtime::Php, client);
        assert_eq!(index.source(), "https://dl.google.com/runtimes/php/version.json");
    }
}
