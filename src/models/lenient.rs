//! Deserializers for backend fields whose JSON type drifts between
//! endpoints (ids and counters arrive as numbers or as strings).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a scalar JSON value as a string. `null` and containers yield `None`.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value)
        .ok_or_else(|| D::Error::custom(format!("expected string or number, got {}", value)))
}

/// Counter that may be `null`, a number, or a numeric string
pub(crate) fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid count: {}", n))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid count {:?}: {}", s, e))),
        other => Err(D::Error::custom(format!("invalid count: {}", other))),
    }
}
