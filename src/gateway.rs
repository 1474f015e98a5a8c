//! HTTP request gateway
//!
//! A single parameterized primitive: POST a JSON payload to
//! `{base_url}/{endpoint}`, decode the JSON reply, and wrap the outcome in an
//! [`ApiResponse`]. The gateway never returns an error; callers inspect the
//! envelope and decide whether a failure is fatal for them.

use crate::transport::{HttpRequest, HttpTransport};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Uniform envelope returned by every gateway call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded and the body decoded
    pub success: bool,
    /// Decoded body, present on success
    pub data: Option<T>,
    /// Failure description, present on failure
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed response
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Error text for logging; empty for successful responses
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }

    /// Escalate a failed response to [`Error::Api`], prefixing the message
    pub fn into_result(self, context: &str) -> Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(Error::Api(format!(
                "{}: {}",
                context,
                self.error.unwrap_or_else(|| "empty response".to_string())
            ))),
        }
    }
}

/// POST-JSON gateway bound to one base URL and a fixed header set
#[derive(Clone)]
pub struct RequestGateway {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl RequestGateway {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a fixed per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// POST `payload` to `endpoint` and decode the reply as `T`
    pub async fn make_request<T, P>(&self, endpoint: &str, payload: &P) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(e) => return ApiResponse::failed(format!("Failed to encode request: {}", e)),
        };

        let url = self.endpoint_url(endpoint);
        let request = HttpRequest::post_json(url.clone(), body)
            .with_headers(&self.headers)
            .with_timeout(self.timeout);

        let reply = match self.transport.send(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(endpoint, error = %e, "Gateway request failed");
                return ApiResponse::failed(e.to_string());
            }
        };

        if !reply.is_success() {
            tracing::debug!(endpoint, status = reply.status, "Gateway request rejected");
            return ApiResponse::failed(format!("HTTP {} for url: {}", reply.status, url));
        }

        match serde_json::from_str::<T>(&reply.body) {
            Ok(data) => ApiResponse::ok(data),
            Err(e) => ApiResponse::failed(format!("Failed to parse response: {}", e)),
        }
    }
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Header values may carry credentials.
        f.debug_struct("RequestGateway")
            .field("transport", &self.transport.name())
            .field("base_url", &self.base_url)
            .field("headers", &self.headers.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;
    use crate::transport::HttpReply;
    use serde_json::{json, Value};

    fn gateway(transport: Arc<RecordingTransport>) -> RequestGateway {
        RequestGateway::new("http://db.local/api/", transport).with_header("x-api-key", "k-123")
    }

    #[test]
    fn test_endpoint_url_joins_single_slash() {
        let gw = gateway(RecordingTransport::new());
        assert_eq!(gw.endpoint_url("agent/get"), "http://db.local/api/agent/get");
        assert_eq!(gw.endpoint_url("/agent/get"), "http://db.local/api/agent/get");
    }

    #[tokio::test]
    async fn test_success_wraps_parsed_body() {
        let transport = RecordingTransport::new();
        transport.reply_json("agent/get", 200, json!({"id": "a1"}));

        let response: ApiResponse<Value> = gateway(transport.clone())
            .make_request("agent/get", &json!({"id": "a1"}))
            .await;

        assert!(response.success);
        assert_eq!(response.data, Some(json!({"id": "a1"})));
        assert!(response.error.is_none());

        let sent = transport.requests_to("agent/get");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header("x-api-key"), Some("k-123"));
        assert_eq!(sent[0].body, Some(json!({"id": "a1"})));
    }

    #[tokio::test]
    async fn test_non_2xx_is_failure() {
        let transport = RecordingTransport::new();
        transport.reply("agent/get", HttpReply::new(503, "unavailable"));

        let response: ApiResponse<Value> =
            gateway(transport).make_request("agent/get", &json!({})).await;

        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(
            response.error.as_deref(),
            Some("HTTP 503 for url: http://db.local/api/agent/get")
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_failure() {
        let transport = RecordingTransport::new();
        transport.fail("agent/get");

        let response: ApiResponse<Value> =
            gateway(transport).make_request("agent/get", &json!({})).await;

        assert!(!response.success);
        assert!(response.error_message().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_failure() {
        let transport = RecordingTransport::new();
        transport.reply("agent/get", HttpReply::new(200, "<html>oops</html>"));

        let response: ApiResponse<Value> =
            gateway(transport).make_request("agent/get", &json!({})).await;

        assert!(!response.success);
        assert!(response.error_message().starts_with("Failed to parse response"));
    }

    #[test]
    fn test_into_result_escalates_failure() {
        let response: ApiResponse<Value> = ApiResponse::failed("HTTP 500");
        let err = response.into_result("Failed to verify agent").unwrap_err();
        assert_eq!(err.to_string(), "API error: Failed to verify agent: HTTP 500");

        let ok: ApiResponse<u32> = ApiResponse::ok(7);
        assert_eq!(ok.into_result("unused").unwrap(), 7);
    }
}
