//! HTTP transport abstraction
//!
//! Every client in this crate talks to the network through the
//! [`HttpTransport`] trait. The production implementation wraps a shared
//! `reqwest::Client`; tests swap in an in-memory transport that records
//! requests and replays scripted replies.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP verb used by the clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// An outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<Value>,
    /// Per-request timeout. `None` leaves the client default in place.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
            timeout: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend(headers.iter().cloned());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw reply: status code plus body text. Non-2xx statuses are not errors
/// at this layer.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error type for transport failures (no reply was received)
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Sends requests and returns raw replies
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError>;

    /// Transport name for logging
    fn name(&self) -> &'static str;
}

/// `reqwest`-backed transport
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Build with an explicit user agent
    pub fn with_user_agent(user_agent: &str) -> crate::Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: request.url.clone(),
                }
            } else {
                TransportError::Request {
                    url: request.url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError::Request {
            url: request.url.clone(),
            message: format!("Failed to read response body: {}", e),
        })?;

        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url,
            status,
            "HTTP request completed"
        );

        Ok(HttpReply { status, body })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_success_range() {
        assert!(HttpReply::new(200, "").is_success());
        assert!(HttpReply::new(201, "").is_success());
        assert!(HttpReply::new(299, "").is_success());
        assert!(!HttpReply::new(301, "").is_success());
        assert!(!HttpReply::new(404, "").is_success());
        assert!(!HttpReply::new(500, "").is_success());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest::post_json("http://localhost/x", json!({}))
            .with_header("x-api-key", "secret");
        assert_eq!(request.header("X-API-KEY"), Some("secret"));
        assert_eq!(request.header("authorization"), None);
    }

    #[test]
    fn test_timeout_error_message() {
        let err = TransportError::Timeout {
            url: "http://localhost/relevant_strategy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request to http://localhost/relevant_strategy timed out"
        );
    }
}
