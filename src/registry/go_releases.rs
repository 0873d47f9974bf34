//! go.dev release index adapter
//!
//! Fetches Go releases from the go.dev download index.
//! API endpoint:
//! - https://go.dev/dl/?mode=json
//!
//! Each record looks like `{"version": "go1.22.3", "stable": true, "files": [...]}`;
//! the `go` prefix is dropped.

use crate::domain::{AvailableVersion, AvailableVersionSet, GO_RELEASES_URL};
use crate::error::IndexError;
use crate::registry::{HttpClient, VersionIndex};
use async_trait::async_trait;
use serde::Deserialize;

/// go.dev release index adapter
pub struct GoReleaseIndex {
    client: HttpClient,
    url: String,
}

/// A release record
#[derive(Debug, Deserialize)]
pub(crate) struct GoRelease {
    version: String,
    #[serde(default)]
    stable: bool,
}

impl GoReleaseIndex {
    /// Create a new go.dev adapter
    pub fn new(client: HttpClient) -> Self {
        Self::with_url(client, GO_RELEASES_URL)
    }

    /// Create an adapter for a mirror of the release index
    pub fn with_url(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// Converts release records to available versions
pub(crate) fn releases_to_versions(releases: Vec<GoRelease>) -> Vec<AvailableVersion> {
    releases
        .into_iter()
        .map(|r| {
            let version = r.version.strip_prefix("go").unwrap_or(&r.version).to_string();
            AvailableVersion::new(version, r.stable)
        })
        .collect()
}

#[async_trait]
impl VersionIndex for GoReleaseIndex {
    fn source(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<AvailableVersionSet, IndexError> {
        let releases: Vec<GoRelease> = self.client.get_json(&self.url).await?;
        Ok(AvailableVersionSet::new(
            releases_to_versions(releases),
            self.url.clone(),
        ))
    }
}
