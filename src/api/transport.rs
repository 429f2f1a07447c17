//! HTTP Transport
//!
//! The network seam of the API client, and its reqwest implementation with a
//! fixed per-request deadline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

use crate::cache::Params;
use crate::config::Config;
use crate::error::ApiError;

/// HTTP verb of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the transport's base URL
    pub endpoint: String,
    /// Query string pairs, sorted by name
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Builds a GET request whose query string carries `params`.
    pub fn get(endpoint: &str, params: Option<&Params>) -> Self {
        let mut query: Vec<(String, String)> = params
            .into_iter()
            .flatten()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.clone(), query_value(value)))
            .collect();
        query.sort();

        Self {
            method: Method::Get,
            endpoint: endpoint.to_string(),
            query,
            body: None,
        }
    }

    pub fn with_body(method: Method, endpoint: &str, body: Option<Value>) -> Self {
        Self {
            method,
            endpoint: endpoint.to_string(),
            query: Vec::new(),
            body,
        }
    }
}

/// Renders a scalar for a query string: strings verbatim, others as JSON.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Sends requests to the backend and returns decoded JSON bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

// == Http Transport ==
/// reqwest-backed transport with a base URL and a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    bearer_token: Option<String>,
}

impl HttpTransport {
    /// Creates a transport for `base_url` that aborts requests after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            bearer_token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = Self::new(
            config.api_base_url.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )?;
        Ok(match &config.api_token {
            Some(token) => transport.with_bearer_token(token.clone()),
            None => transport,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    async fn exchange(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut builder = self
            .client
            .request(request.method.into(), self.url(&request.endpoint))
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            let body = serde_json::from_str::<Value>(&text)
                .ok()
                .or_else(|| (!text.is_empty()).then(|| Value::String(text)));
            return Err(ApiError::Http {
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
                body,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn classify(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            self.timeout_error()
        } else {
            ApiError::Transport(error.to_string())
        }
    }

    fn timeout_error(&self) -> ApiError {
        ApiError::Timeout {
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        debug!(method = ?request.method, endpoint = %request.endpoint, "Sending request");

        // Dropping the in-flight future on expiry aborts the connection
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error()),
        }
    }
}
