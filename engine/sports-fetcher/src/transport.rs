//! HTTP transport abstraction

use crate::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Raw upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a GET and returns status plus body
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Production transport backed by reqwest
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response =
            self.client.get(url).send().await.map_err(|e| FetchError::network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| FetchError::network(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
