//! Backend database API client
//!
//! [`ApiDb`] wraps the backend's POST-only JSON API. Two error policies
//! coexist and are chosen per operation:
//!
//! - fail-raise: reads the agent loop cannot proceed without (agent
//!   verification while fetching parameters, the v1 notification feed)
//!   return [`crate::Error::Api`];
//! - fail-soft: writes and most reads log a warning and return a benign
//!   default (`true`, `None`, an empty list, a fallback string).
//!
//! Nothing is retried and nothing is cached; every call re-fetches.

mod chat_history;
mod notifications;
mod sessions;
mod strategies;

pub use chat_history::{message_timestamps, TIMESTAMP_FORMAT};
pub use notifications::NO_NOTIFICATIONS_FALLBACK;

use crate::gateway::RequestGateway;
use crate::transport::{HttpTransport, ReqwestTransport};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Backend endpoint paths
pub mod endpoints {
    pub const AGENT_GET: &str = "agent/get";
    pub const STRATEGIES_GET: &str = "strategies/get";
    pub const STRATEGIES_GET_2: &str = "strategies/get_2";
    pub const STRATEGIES_CREATE: &str = "strategies/create";
    pub const CHAT_HISTORY_CREATE: &str = "chat_history/create";
    pub const NOTIFICATION_GET: &str = "notification/get";
    pub const NOTIFICATION_GET_V3: &str = "notification/get_v3";
    pub const SESSION_GET: &str = "session/get";
    pub const AGENT_SESSIONS_GET_V2: &str = "agent_sessions/get_v2";
    pub const AGENT_SESSIONS_CREATE: &str = "agent_sessions/create";
    pub const AGENT_SESSIONS_UPDATE: &str = "agent_sessions/update";
}

/// Header carrying the backend API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Client for the backend database API
#[derive(Debug, Clone)]
pub struct ApiDb {
    gateway: RequestGateway,
}

impl ApiDb {
    /// Create a client using the default `reqwest` transport
    pub fn new(base_url: impl Into<String>, api_key: &SecretString) -> Self {
        Self::with_transport(base_url, api_key, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client over a custom transport
    pub fn with_transport(
        base_url: impl Into<String>,
        api_key: &SecretString,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let gateway = RequestGateway::new(base_url, transport)
            .with_header(API_KEY_HEADER, api_key.expose_secret())
            .with_header("Content-Type", "application/json");
        Self { gateway }
    }

    pub fn base_url(&self) -> &str {
        self.gateway.base_url()
    }

    pub(crate) fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }
}
