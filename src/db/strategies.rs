//! Strategy store operations

use super::endpoints;
use super::ApiDb;
use crate::gateway::ApiResponse;
use crate::models::{
    record_owned_by, record_strategy_id, strategy_from_record, StrategyData, StrategyInsertData,
    StrategyListing, StrategyParams,
};
use crate::{Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

impl ApiDb {
    /// Fetch parameters and descriptions of every strategy owned by `agent_id`.
    ///
    /// Fails if the agent cannot be verified, if the listing cannot be
    /// fetched, or if any of the agent's records is malformed (one bad record
    /// aborts the batch).
    pub async fn fetch_params_by_agent_id(
        &self,
        agent_id: &str,
    ) -> Result<HashMap<String, StrategyParams>> {
        self.gateway()
            .make_request::<Value, _>(endpoints::AGENT_GET, &json!({ "id": agent_id }))
            .await
            .into_result("Failed to verify agent")?;

        let records = self
            .gateway()
            .make_request::<StrategyListing, _>(endpoints::STRATEGIES_GET, &json!({}))
            .await
            .into_result("Failed to fetch strategies")?
            .into_records();

        let mut params = HashMap::new();
        for record in owned_by(records, agent_id) {
            let strategy = strategy_from_record(&record, agent_id).map_err(|e| {
                let id = record_strategy_id(&record).unwrap_or_default();
                Error::Api(format!("Error processing strategy {}: {}", id, e))
            })?;
            params.insert(strategy.strategy_id.clone(), StrategyParams::from(strategy));
        }

        Ok(params)
    }

    /// Store a new strategy for `agent_id`.
    ///
    /// Best-effort: verification and insert failures are logged and the call
    /// still reports success so the agent loop keeps running.
    pub async fn insert_strategy_and_result(
        &self,
        agent_id: &str,
        strategy: &StrategyInsertData,
    ) -> bool {
        let agent = self
            .gateway()
            .make_request::<Value, _>(endpoints::AGENT_GET, &json!({ "id": agent_id }))
            .await;
        if !agent.success {
            warn!(agent_id, error = agent.error_message(), "Failed to verify agent");
        }

        let parameters = match serde_json::to_string(&strategy.parameters) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(agent_id, error = %e, "Failed to encode strategy parameters");
                return true;
            }
        };

        let payload = json!({
            "agent_id": agent_id,
            "summarized_desc": strategy.summarized_desc,
            "full_desc": strategy.full_desc,
            "parameters": parameters,
        });

        let response = self
            .gateway()
            .make_request::<Value, _>(endpoints::STRATEGIES_CREATE, &payload)
            .await;
        if !response.success {
            warn!(agent_id, error = response.error_message(), "Failed to insert strategy");
        }

        true
    }

    /// Most recent strategy of `agent_id`: the one with the lexicographically
    /// greatest `strategy_id`. Only that record is decoded. `None` when there
    /// is none, the fetch fails, or the newest record is malformed.
    pub async fn fetch_latest_strategy(&self, agent_id: &str) -> Option<StrategyData> {
        let response = self
            .gateway()
            .make_request::<StrategyListing, _>(endpoints::STRATEGIES_GET_2, &json!({}))
            .await;
        let ApiResponse { data, error, .. } = response;
        let Some(listing) = data else {
            warn!(agent_id, error = error.as_deref(), "Failed to fetch strategies");
            return None;
        };

        let latest = latest_record(owned_by(listing.into_records(), agent_id))?;
        strategy_from_record(&latest, agent_id)
            .map_err(|e| warn!(agent_id, error = %e, "Error fetching latest strategy"))
            .ok()
    }

    /// Every strategy of `agent_id`; empty on any failure.
    pub async fn fetch_all_strategies(&self, agent_id: &str) -> Vec<StrategyData> {
        let response = self
            .gateway()
            .make_request::<StrategyListing, _>(endpoints::STRATEGIES_GET, &json!({}))
            .await;
        let ApiResponse { data, error, .. } = response;
        let Some(listing) = data else {
            warn!(agent_id, error = error.as_deref(), "Failed to fetch strategies");
            return Vec::new();
        };

        decode_all(owned_by(listing.into_records(), agent_id), agent_id).unwrap_or_else(|e| {
            warn!(agent_id, error = %e, "Error fetching strategies");
            Vec::new()
        })
    }
}

fn owned_by(records: Vec<Value>, agent_id: &str) -> impl Iterator<Item = Value> + '_ {
    records
        .into_iter()
        .filter(move |record| record_owned_by(record, agent_id))
}

fn decode_all(
    records: impl Iterator<Item = Value>,
    agent_id: &str,
) -> std::result::Result<Vec<StrategyData>, crate::models::RecordError> {
    records
        .map(|record| strategy_from_record(&record, agent_id))
        .collect()
}

/// Raw record with the greatest id under string ordering. A record without
/// an id ranks as `""`; the first of equal ids wins.
fn latest_record(records: impl Iterator<Item = Value>) -> Option<Value> {
    records
        .map(|record| (record_strategy_id(&record).unwrap_or_default(), record))
        .fold(None, |best: Option<(String, Value)>, (id, record)| match best {
            Some((best_id, best)) if best_id >= id => Some((best_id, best)),
            _ => Some((id, record)),
        })
        .map(|(_, record)| record)
}
