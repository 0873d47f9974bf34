//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries)
//! - Rate limit error handling

use crate::error::IndexError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("bpkit/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, IndexError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                IndexError::network_error("", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Perform a GET request with retry logic
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, IndexError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            debug!(url, attempt, "GET");
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(IndexError::RateLimitExceeded {
                            url: url.to_string(),
                        });
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(IndexError::NotFound {
                            url: url.to_string(),
                        });
                    } else if status.is_server_error() {
                        last_error = Some(IndexError::network_error(url, format!("HTTP {}", status)));
                    } else if !status.is_success() {
                        return Err(IndexError::network_error(url, format!("HTTP {}", status)));
                    } else {
                        return Ok(response);
                    }
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        IndexError::timeout(url)
                    } else {
                        IndexError::network_error(url, e.to_string())
                    });
                }
            }

            if attempt < self.max_retries {
                warn!(url, attempt, delay_ms = delay, "request failed, retrying");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| IndexError::network_error(url, "unknown error")))
    }

    /// Perform a GET request and parse the JSON body
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, IndexError> {
        let response = self.get(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| IndexError::network_error(url, format!("failed to read body: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| IndexError::invalid_response(url, format!("failed to parse JSON: {}", e)))
    }
}
