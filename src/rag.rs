//! Retrieval-augmented generation service client
//!
//! Stores strategy summaries for semantic search and retrieves strategies
//! relevant to a free-text query. Scoping is done through the `agent_id` and
//! `session_id` body fields; the service takes no auth header. Every call is
//! fail-soft.

use crate::gateway::{ApiResponse, RequestGateway};
use crate::models::StrategyData;
use crate::transport::{HttpTransport, ReqwestTransport};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_RAG_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_RAG_TIMEOUT: Duration = Duration::from_secs(5);

const SAVE_RESULT_BATCH: &str = "save_result_batch";
const RELEVANT_STRATEGY: &str = "relevant_strategy";

/// Flat record stored per strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
struct RagInsertRecord<'a> {
    strategy: &'a str,
    /// JSON-encoded [`StrategyData`]
    strategy_data: String,
    reference_id: &'a str,
    agent_id: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagMetadata {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub reference_id: Option<String>,
    /// JSON-encoded [`StrategyData`]
    pub strategy_data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageContent {
    pub metadata: RagMetadata,
    #[serde(default)]
    pub page_content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyResponse {
    pub data: Vec<PageContent>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// RAG service client bound to one agent session
#[derive(Debug, Clone)]
pub struct RagClient {
    gateway: RequestGateway,
    agent_id: String,
    session_id: String,
}

impl RagClient {
    /// Create a client using the default `reqwest` transport
    pub fn new(
        agent_id: impl Into<String>,
        session_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_transport(agent_id, session_id, base_url, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client over a custom transport
    pub fn with_transport(
        agent_id: impl Into<String>,
        session_id: impl Into<String>,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            gateway: RequestGateway::new(base_url, transport).with_timeout(DEFAULT_RAG_TIMEOUT),
            agent_id: agent_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.gateway = self.gateway.with_timeout(timeout);
        self
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Store `batch` in one request and return the service's reply.
    ///
    /// An empty batch makes no request. Failures are logged and yield `{}`.
    pub async fn save_result_batch(&self, batch: &[StrategyData]) -> Value {
        if batch.is_empty() {
            debug!("No batch data to save");
            return json!({});
        }

        let mut records = Vec::with_capacity(batch.len());
        for strategy in batch {
            let strategy_data = match serde_json::to_string(strategy) {
                Ok(encoded) => encoded,
                Err(e) => {
                    warn!(strategy_id = %strategy.strategy_id, error = %e, "Failed to encode strategy");
                    return json!({});
                }
            };
            records.push(RagInsertRecord {
                strategy: &strategy.summarized_desc,
                strategy_data,
                reference_id: &strategy.strategy_id,
                agent_id: &self.agent_id,
                session_id: &self.session_id,
            });
        }

        let response: ApiResponse<Value> =
            self.gateway.make_request(SAVE_RESULT_BATCH, &records).await;
        match response.data {
            Some(reply) => reply,
            None => {
                warn!(
                    agent_id = %self.agent_id,
                    error = response.error.as_deref(),
                    "Failed to save result batch to RAG"
                );
                json!({})
            }
        }
    }

    /// Strategies the service considers relevant to `query`; empty on any
    /// failure or malformed entry.
    pub async fn relevant_strategy_raw(&self, query: &str) -> Vec<StrategyData> {
        let payload = json!({
            "query": query,
            "agent_id": self.agent_id,
            "session_id": self.session_id,
        });

        let response: ApiResponse<StrategyResponse> =
            self.gateway.make_request(RELEVANT_STRATEGY, &payload).await;
        let ApiResponse { data, error, .. } = response;
        let Some(found) = data else {
            warn!(error = error.as_deref(), "Failed to get relevant strategies from RAG");
            return Vec::new();
        };

        let decoded: Result<Vec<StrategyData>, _> = found
            .data
            .iter()
            .map(|page| serde_json::from_str::<StrategyData>(&page.metadata.strategy_data))
            .collect();

        decoded.unwrap_or_else(|e| {
            warn!(error = %e, "Malformed strategy data from RAG");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;
    use serde_json::Map;

    fn client(transport: &Arc<RecordingTransport>) -> RagClient {
        RagClient::with_transport("agent-1", "session-1", "http://rag.test", transport.clone())
    }

    fn strategy(id: &str) -> StrategyData {
        let mut parameters = Map::new();
        parameters.insert("lookback".to_string(), json!(30));
        parameters.insert("assets".to_string(), json!(["BTC", "ETH"]));
        StrategyData {
            strategy_id: id.to_string(),
            agent_id: "agent-1".to_string(),
            parameters,
            summarized_desc: format!("summary {}", id),
            full_desc: format!("full description {}", id),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let transport = RecordingTransport::new();
        let reply = client(&transport).save_result_batch(&[]).await;
        assert_eq!(reply, json!({}));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_batch_sent_as_single_list() {
        let transport = RecordingTransport::new();
        transport.reply_json(SAVE_RESULT_BATCH, 200, json!({"status": "ok", "count": 2}));

        let reply = client(&transport)
            .save_result_batch(&[strategy("s1"), strategy("s2")])
            .await;
        assert_eq!(reply["count"], json!(2));

        let requests = transport.requests_to(SAVE_RESULT_BATCH);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].timeout, Some(DEFAULT_RAG_TIMEOUT));
        assert!(requests[0].header("x-api-key").is_none());

        let body = requests[0].body.clone().unwrap();
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["strategy"], json!("summary s1"));
        assert_eq!(records[0]["reference_id"], json!("s1"));
        assert_eq!(records[0]["agent_id"], json!("agent-1"));
        assert_eq!(records[0]["session_id"], json!("session-1"));

        let embedded: StrategyData =
            serde_json::from_str(records[1]["strategy_data"].as_str().unwrap()).unwrap();
        assert_eq!(embedded, strategy("s2"));
    }

    #[tokio::test]
    async fn test_save_failure_returns_empty_object() {
        let transport = RecordingTransport::new();
        transport.fail(SAVE_RESULT_BATCH);
        let reply = client(&transport).save_result_batch(&[strategy("s1")]).await;
        assert_eq!(reply, json!({}));
    }

    #[tokio::test]
    async fn test_saved_strategy_round_trips_through_search() {
        let transport = RecordingTransport::new();
        transport.reply_json(SAVE_RESULT_BATCH, 200, json!({}));
        let rag = client(&transport);

        let saved_strategy = strategy("2024-05-01-0001");
        rag.save_result_batch(std::slice::from_ref(&saved_strategy)).await;

        // echo the stored record back the way the service does
        let saved = transport.bodies_to(SAVE_RESULT_BATCH)[0][0].clone();
        transport.reply_json(
            RELEVANT_STRATEGY,
            200,
            json!({
                "data": [{
                    "metadata": {
                        "created_at": "2024-05-01 10:00:00",
                        "reference_id": saved["reference_id"],
                        "strategy_data": saved["strategy_data"],
                    },
                    "page_content": saved["strategy"],
                }],
                "msg": "ok",
                "status": "success"
            }),
        );

        let found = rag.relevant_strategy_raw("momentum on majors").await;
        assert_eq!(found, vec![saved_strategy]);

        assert_eq!(
            transport.bodies_to(RELEVANT_STRATEGY),
            vec![json!({
                "query": "momentum on majors",
                "agent_id": "agent-1",
                "session_id": "session-1"
            })]
        );
    }

    #[tokio::test]
    async fn test_malformed_search_result_is_empty() {
        let transport = RecordingTransport::new();
        transport.reply_json(
            RELEVANT_STRATEGY,
            200,
            json!({"data": [{"metadata": {"strategy_data": "{\"strategy_id\": 1"}, "page_content": ""}]}),
        );
        assert!(client(&transport).relevant_strategy_raw("q").await.is_empty());

        let transport = RecordingTransport::new();
        transport.reply_json(RELEVANT_STRATEGY, 200, json!({"unexpected": true}));
        assert!(client(&transport).relevant_strategy_raw("q").await.is_empty());
    }
}
