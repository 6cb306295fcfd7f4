//! reqwest-backed transport for the resource endpoint.
//!
//! ### Request shape
//! - Paths from the controller are resolved under the configured base URL.
//! - A resource id is appended as a single percent-encoded path segment.
//! - Query parameters are sent as-is; bodies are sent as JSON.
//!
//! ### Response handling
//! - 2xx: the body is decoded as JSON (empty body → `null`).
//! - Anything else: `TransportError::Remote` carrying the body's `message`
//!   field when present, the status reason otherwise.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use httpcache_core::{Method, ResourceRequest, Transport, TransportError};
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::url::{canonicalize_base, resolve_resource};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the resource endpoint (default: "http://localhost:3000")
    pub base_url: String,

    /// User agent string (default: "httpcache/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            user_agent: "httpcache/0.1".to_string(),
            timeout: Duration::from_millis(20000),
        }
    }
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Message for a non-success response: the body's `message`, else the status.
fn remote_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("status {}", status.as_u16()))
        })
}

/// HTTP transport against one resource endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base: url::Url,
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self, ClientError> {
        let base = canonicalize_base(&config.base_url)?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(ClientError::from)?;

        Ok(Self { http, base, config })
    }

    /// Canonical base URL requests are resolved against.
    pub fn base_url(&self) -> &url::Url {
        &self.base
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    async fn execute(&self, request: ResourceRequest) -> Result<Value, TransportError> {
        let start = Instant::now();
        let url =
            resolve_resource(&self.base, &request.path, request.resource.as_deref()).map_err(ClientError::from)?;

        let mut builder = self
            .http
            .request(to_reqwest(request.method), url.clone())
            .header(header::ACCEPT, "application/json");

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ClientError::from)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::from)?;

        tracing::debug!(
            "{} {} -> {} in {}ms ({} bytes)",
            request.method,
            url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        if !status.is_success() {
            return Err(TransportError::Remote { status: status.as_u16(), message: remote_message(status, &bytes) });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| TransportError::InvalidBody(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: ResourceRequest) -> Result<Value, TransportError> {
        self.execute(request).await
    }
}
