//! Agent session records

use super::lenient::{optional_count, string_or_number};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One run of an agent, keyed by `(session_id, agent_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, deserialize_with = "string_or_number")]
    pub session_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub agent_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    pub cycle_count: Option<u64>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub fe_data: Option<Value>,
    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Current cycle count; absent counts as zero
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_defaults_missing_fields() {
        let session: Session = serde_json::from_value(json!({
            "session_id": "s-1",
            "agent_id": 9,
            "status": "running",
            "region": "eu"
        }))
        .unwrap();

        assert_eq!(session.agent_id, "9");
        assert_eq!(session.cycle_count(), 0);
        assert!(session.fe_data.is_none());
        assert_eq!(session.extra.get("region"), Some(&json!("eu")));
    }

    #[test]
    fn test_session_string_cycle_count() {
        let session: Session = serde_json::from_value(json!({
            "session_id": "s-1",
            "agent_id": "a-1",
            "cycle_count": "12"
        }))
        .unwrap();
        assert_eq!(session.cycle_count(), 12);
    }
}
