//! HTTP client with transparent payload decompression
//!
//! All source fetches go through [`DecompressingHttpClient`], so handlers
//! never care whether a guide or playlist URL serves gzip or plain text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::{SourceError, SourceResult};
use crate::utils::DecompressionService;

/// HTTP client trait that provides automatic decompression for all content types
#[async_trait]
pub trait DecompressingHttpClient {
    /// Fetch URL and return decompressed text content
    async fn fetch_text(&self, url: &str) -> SourceResult<String>;

    /// Fetch URL and return decompressed JSON content
    async fn fetch_json<T: DeserializeOwned + Send>(&self, url: &str) -> SourceResult<T>;

    /// Fetch URL and return raw decompressed bytes
    async fn fetch_bytes(&self, url: &str) -> SourceResult<Vec<u8>>;
}

/// Default implementation of [`DecompressingHttpClient`] using reqwest
#[derive(Clone)]
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    /// Create a client with a connection timeout only, so large guide
    /// downloads are not cut off mid-transfer
    pub fn new(config: &HttpConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    async fn get(&self, url: &str) -> SourceResult<Response> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                SourceError::Timeout {
                    url: url.to_string(),
                }
            } else {
                SourceError::parse("http", e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(SourceError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn response_to_bytes(response: Response, url: &str) -> SourceResult<Vec<u8>> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::parse("http", format!("failed to read {url}: {e}")))?;

        let decompressed = DecompressionService::decompress(bytes)?;
        debug!("Fetched {} bytes from {}", decompressed.len(), url);
        Ok(decompressed)
    }
}

#[async_trait]
impl DecompressingHttpClient for StandardHttpClient {
    async fn fetch_text(&self, url: &str) -> SourceResult<String> {
        let bytes = self.fetch_bytes(url).await?;
        String::from_utf8(bytes)
            .map_err(|e| SourceError::parse("http", format!("invalid UTF-8 from {url}: {e}")))
    }

    async fn fetch_json<T: DeserializeOwned + Send>(&self, url: &str) -> SourceResult<T> {
        let text = self.fetch_text(url).await?;
        serde_json::from_str(&text)
            .map_err(|e| SourceError::parse("json", format!("invalid JSON from {url}: {e}")))
    }

    async fn fetch_bytes(&self, url: &str) -> SourceResult<Vec<u8>> {
        let response = self.get(url).await?;
        Self::response_to_bytes(response, url).await
    }
}
