//! HTTP client abstraction for testability

use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::ACCEPT;

use super::types::ProviderError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for async HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request with the given `Accept` header.
    ///
    /// Non-2xx responses are reported as [`ProviderError::HttpStatus`].
    fn get<'a>(&'a self, url: &'a str, accept: &'a str)
        -> BoxFuture<'a, Result<Bytes, ProviderError>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("termap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    fn get<'a>(
        &'a self,
        url: &'a str,
        accept: &'a str,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        async move {
            let response = self
                .client
                .get(url)
                .header(ACCEPT, accept)
                .send()
                .await
                .map_err(|e| ProviderError::Http(format!("Request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::HttpStatus {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("").to_string(),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| ProviderError::Http(format!("Failed to read response: {}", e)))
        }
        .boxed()
    }
}
