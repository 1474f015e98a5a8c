//! Session lifecycle operations
//!
//! All of these are fail-soft. `add_cycle_count` is a plain
//! read-modify-write with no conditional update: two callers incrementing
//! the same session concurrently can lose one increment.

use super::endpoints;
use super::ApiDb;
use crate::gateway::ApiResponse;
use crate::models::Session;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    data: Session,
}

#[derive(Debug, Deserialize)]
struct SessionListEnvelope {
    data: Vec<Session>,
}

impl ApiDb {
    /// Register a new session. Always reports success.
    pub async fn create_session(
        &self,
        session_id: &str,
        agent_id: &str,
        started_at: &str,
        status: &str,
    ) -> bool {
        let payload = json!({
            "session_id": session_id,
            "agent_id": agent_id,
            "started_at": started_at,
            "status": status,
        });

        let response = self
            .gateway()
            .make_request::<Value, _>(endpoints::AGENT_SESSIONS_CREATE, &payload)
            .await;
        if !response.success {
            warn!(
                session_id,
                agent_id,
                error = response.error_message(),
                "Failed to create agent session"
            );
        }
        true
    }

    /// Read a session; `None` when it cannot be fetched or decoded
    pub async fn get_session(&self, session_id: &str, agent_id: &str) -> Option<Session> {
        let response: ApiResponse<SessionEnvelope> = self
            .gateway()
            .make_request(
                endpoints::SESSION_GET,
                &json!({ "session_id": session_id, "agent_id": agent_id }),
            )
            .await;

        if !response.success {
            warn!(
                session_id,
                agent_id,
                error = response.error_message(),
                "Failed to get agent session"
            );
        }
        response.data.map(|envelope| envelope.data)
    }

    /// Set the session status, optionally with an opaque frontend payload.
    /// Always reports success.
    pub async fn update_session(
        &self,
        session_id: &str,
        agent_id: &str,
        status: &str,
        fe_data: Option<&str>,
    ) -> bool {
        let mut payload = json!({
            "session_id": session_id,
            "agent_id": agent_id,
            "status": status,
        });
        if let Some(fe_data) = fe_data.filter(|d| !d.is_empty()) {
            payload["fe_data"] = json!(fe_data);
        }

        let response = self
            .gateway()
            .make_request::<Value, _>(endpoints::AGENT_SESSIONS_UPDATE, &payload)
            .await;
        if !response.success {
            warn!(
                session_id,
                agent_id,
                error = response.error_message(),
                "Failed to update agent session"
            );
        }
        true
    }

    /// Increment the session's cycle counter by one. Always reports success.
    pub async fn add_cycle_count(&self, session_id: &str, agent_id: &str) -> bool {
        let response: ApiResponse<SessionListEnvelope> = self
            .gateway()
            .make_request(
                endpoints::AGENT_SESSIONS_GET_V2,
                &json!({ "session_id": session_id, "agent_id": agent_id }),
            )
            .await;

        let ApiResponse { data, error, .. } = response;
        let Some(session) = data.and_then(|envelope| envelope.data.into_iter().next()) else {
            warn!(
                session_id,
                agent_id,
                error = error.as_deref(),
                "Failed to get agent session for cycle count"
            );
            return true;
        };

        let next = session.cycle_count() + 1;
        debug!(session_id, agent_id, cycle_count = next, "Incrementing cycle count");

        let update = self
            .gateway()
            .make_request::<Value, _>(
                endpoints::AGENT_SESSIONS_UPDATE,
                &json!({
                    "session_id": session_id,
                    "agent_id": agent_id,
                    "cycle_count": next.to_string(),
                }),
            )
            .await;
        if !update.success {
            warn!(
                session_id,
                agent_id,
                error = update.error_message(),
                "Failed to update cycle count"
            );
        }
        true
    }
}
