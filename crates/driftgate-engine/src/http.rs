//! HTTP transport seam.
//!
//! The executor and prober only see [`HttpTransport`]; production wiring
//! injects [`ReqwestTransport`], tests inject an in-memory fake. A transport
//! error means the call failed before a status code was obtained.

use async_trait::async_trait;
use driftgate_core::errors::{DgError, DgErrorKind, Result};
use driftgate_core::model::HttpMethod;
use serde_json::Value;

/// A fully resolved HTTP request, placeholders already substituted
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl PreparedRequest {
    /// A bare GET request for a URL (the prober's shape of call)
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body_text: String,
}

impl HttpResponse {
    /// True for any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, if it is JSON
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body_text).ok()
    }
}

/// Abstraction over the HTTP client.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one request.
    ///
    /// # Errors
    ///
    /// Returns `DgErrorKind::Transport` when the exchange fails before a
    /// status code is obtained (DNS, connect, TLS, read failures). A non-2xx
    /// status is NOT an error at this layer.
    async fn execute(&self, request: &PreparedRequest) -> Result<HttpResponse>;
}

/// Production transport backed by a shared reqwest client
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with default client settings
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn transport_error(request: &PreparedRequest, err: reqwest::Error) -> DgError {
    DgError::new(DgErrorKind::Transport)
        .with_op("http_execute")
        .with_message(format!("{} {} failed: {}", request.method, request.url, err))
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &PreparedRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(request, e))?;
        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| transport_error(request, e))?;

        Ok(HttpResponse { status, body_text })
    }
}
