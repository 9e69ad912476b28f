//! HTTP transport seam
//!
//! The client talks to the service exclusively through [`Transport`], so tests
//! can substitute a mock and alternative HTTP stacks can be plugged in.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, Method};
use thiserror::Error;
use tracing::debug;

use crate::request::Params;

/// Type-erased transport failure
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Outbound HTTP request, relative to the transport's base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Endpoint path without leading slash
    pub path: String,
    /// Query string parameters
    pub query: Params,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a GET request
    pub fn get(path: impl Into<String>, query: Params) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query,
            headers: Vec::new(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response from a status and a body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body as text, replacing invalid UTF-8
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Non-2xx response
#[derive(Debug, Clone, Error)]
#[error("HTTP {status}")]
pub struct HttpStatusError {
    /// Status code returned by the server
    pub status: u16,
}

/// Sends HTTP requests to the geocoding service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport for a base URL with a request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let url = self.url(&request.path);
        debug!(%url, method = %request.method, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Box::new(HttpStatusError {
                status: status.as_u16(),
            }));
        }

        let body = response.bytes().await?;
        Ok(HttpResponse::new(status.as_u16(), body.to_vec()))
    }
}
