//! HTTP client for gateway testing
//!
//! Thin wrapper over reqwest that measures round-trip time and classifies
//! transport failures.

use anyhow::{Context, Result};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// HTTP client bound to the gateway base URL
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base_url: Option<String>,
    timeout_secs: u64,
}

impl HttpClient {
    /// Create client with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: None,
            timeout_secs,
        })
    }

    /// Set base URL for requests
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build full URL
    fn build_url(&self, path: &str) -> String {
        match &self.base_url {
            Some(base) => {
                if path.starts_with("http://") || path.starts_with("https://") {
                    path.to_string()
                } else {
                    format!("{}{}", base.trim_end_matches('/'), path)
                }
            }
            None => path.to_string(),
        }
    }

    /// Map a reqwest failure onto the harness error kinds
    fn classify(&self, err: reqwest::Error, url: &str) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            HttpError::ConnectionRefused(url.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(url.to_string())
        } else {
            HttpError::RequestFailed(err.to_string())
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<HttpResponse> {
        let start = Instant::now();

        let response = request
            .send()
            .await
            .map_err(|e| anyhow::Error::new(self.classify(e, url)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow::Error::new(self.classify(e, url)))?;

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        debug!(
            "Response: {} {} in {:.2}ms",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            duration_ms
        );

        Ok(HttpResponse {
            status_code: status.as_u16(),
            body,
            duration_ms,
        })
    }

    /// GET a gateway path
    pub async fn get(&self, path: &str) -> Result<HttpResponse> {
        let url = self.build_url(path);
        debug!("GET {}", url);
        self.send(self.client.get(&url), &url).await
    }

    /// POST a raw body with an explicit content type
    pub async fn post_raw(
        &self,
        path: &str,
        body: impl Into<String>,
        content_type: &str,
    ) -> Result<HttpResponse> {
        let url = self.build_url(path);
        debug!("POST {} ({})", url, content_type);
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .body(body.into());
        self.send(request, &url).await
    }

    /// POST a JSON document
    pub async fn post_json(&self, path: &str, payload: &serde_json::Value) -> Result<HttpResponse> {
        let body = serde_json::to_string(payload).context("Failed to serialize payload")?;
        self.post_raw(path, body, "application/json").await
    }
}

/// Gateway reply with its round-trip time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    /// Round-trip time including body read
    pub duration_ms: f64,
}

impl HttpResponse {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    pub fn body_contains(&self, text: &str) -> bool {
        self.body.contains(text)
    }

    /// Parse the body as JSON, if it is JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}
