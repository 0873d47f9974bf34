//! Generic JSON index adapter
//!
//! Fetches `[{"version": "1.2.3", "stable": true}, ...]` from any URL.
//! Plain string arrays are accepted too.

use crate::domain::AvailableVersionSet;
use crate::error::IndexError;
use crate::registry::{parse_index, HttpClient, VersionIndex};
use async_trait::async_trait;
use serde_json::Value;

/// Generic JSON index adapter
pub struct JsonRecordIndex {
    client: HttpClient,
    url: String,
}

impl JsonRecordIndex {
    pub fn new(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl VersionIndex for JsonRecordIndex {
    fn source(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<AvailableVersionSet, IndexError> {
        let body: Value = self.client.get_json(&self.url).await?;
        parse_index(body, &self.url)
    }
}
