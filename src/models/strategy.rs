//! Strategy records

use super::lenient::scalar_to_string;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored trading strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyData {
    pub strategy_id: String,
    pub agent_id: String,
    pub parameters: Map<String, Value>,
    pub summarized_desc: String,
    pub full_desc: String,
}

/// Write-side strategy; the backend assigns the id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyInsertData {
    pub summarized_desc: String,
    pub full_desc: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Strategy parameters and descriptions, keyed externally by strategy id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub parameters: Map<String, Value>,
    pub summarized_desc: String,
    pub full_desc: String,
}

impl From<StrategyData> for StrategyParams {
    fn from(strategy: StrategyData) -> Self {
        Self {
            parameters: strategy.parameters,
            summarized_desc: strategy.summarized_desc,
            full_desc: strategy.full_desc,
        }
    }
}

/// A backend strategy record that could not be decoded
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing key '{0}'")]
    MissingField(&'static str),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Strategy listings arrive either bare or wrapped in `{"data": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StrategyListing {
    Wrapped { data: Vec<Value> },
    Bare(Vec<Value>),
}

impl StrategyListing {
    pub(crate) fn into_records(self) -> Vec<Value> {
        match self {
            StrategyListing::Wrapped { data } => data,
            StrategyListing::Bare(records) => records,
        }
    }
}

/// Whether a raw record belongs to `agent_id`. Only string ids match.
pub(crate) fn record_owned_by(record: &Value, agent_id: &str) -> bool {
    record.get("agent_id").and_then(Value::as_str) == Some(agent_id)
}

/// Id of a raw record: `strategy_id`, falling back to `id`
pub(crate) fn record_strategy_id(record: &Value) -> Option<String> {
    record
        .get("strategy_id")
        .and_then(scalar_to_string)
        .or_else(|| record.get("id").and_then(scalar_to_string))
}

/// Decode a raw backend record into a [`StrategyData`] owned by `agent_id`.
///
/// The id is read from `strategy_id`, falling back to `id`. `parameters` is
/// normally a JSON-encoded string; an inline object is accepted as well.
pub(crate) fn strategy_from_record(
    record: &Value,
    agent_id: &str,
) -> Result<StrategyData, RecordError> {
    let obj = record.as_object().ok_or(RecordError::NotAnObject)?;

    let strategy_id =
        record_strategy_id(record).ok_or(RecordError::MissingField("strategy_id"))?;

    let parameters = match obj.get("parameters") {
        Some(Value::String(encoded)) => serde_json::from_str::<Map<String, Value>>(encoded)
            .map_err(|e| RecordError::InvalidParameters(e.to_string()))?,
        Some(Value::Object(inline)) => inline.clone(),
        Some(other) => {
            return Err(RecordError::InvalidParameters(format!(
                "expected JSON object, got {}",
                other
            )))
        }
        None => return Err(RecordError::MissingField("parameters")),
    };

    let text = |key: &'static str| {
        obj.get(key)
            .and_then(scalar_to_string)
            .ok_or(RecordError::MissingField(key))
    };

    Ok(StrategyData {
        strategy_id,
        agent_id: agent_id.to_string(),
        parameters,
        summarized_desc: text("summarized_desc")?,
        full_desc: text("full_desc")?,
    })
}
