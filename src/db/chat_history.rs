//! Chat history writer

use super::endpoints;
use super::ApiDb;
use crate::models::ChatHistory;
use chrono::{Duration, NaiveDateTime, Utc};
use serde_json::{json, Value};
use tracing::warn;

/// Wire format of chat timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamps for `count` messages starting at `base`, one second apart
pub fn message_timestamps(base: NaiveDateTime, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            (base + Duration::seconds(i as i64))
                .format(TIMESTAMP_FORMAT)
                .to_string()
        })
        .collect()
}

fn resolve_base_timestamp(base_timestamp: Option<&str>) -> NaiveDateTime {
    match base_timestamp.filter(|t| !t.is_empty()) {
        Some(raw) => NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).unwrap_or_else(|e| {
            warn!(timestamp = raw, error = %e, "Invalid timestamp format, using current time");
            Utc::now().naive_utc()
        }),
        None => Utc::now().naive_utc(),
    }
}

impl ApiDb {
    /// Write `history` message by message, in order.
    ///
    /// Message `i` is stamped `base + i` seconds, where `base` is parsed from
    /// `base_timestamp` (`YYYY-MM-DD HH:MM:SS`) or is the current UTC time.
    /// A failed write is logged and the remaining messages are still sent;
    /// the call always reports success.
    pub async fn insert_chat_history(
        &self,
        session_id: &str,
        history: &ChatHistory,
        base_timestamp: Option<&str>,
    ) -> bool {
        let base = resolve_base_timestamp(base_timestamp);
        let timestamps = message_timestamps(base, history.len());

        for (index, (message, timestamp)) in history.messages.iter().zip(timestamps).enumerate() {
            let payload = json!({
                "session_id": session_id,
                "role": message.role.as_str(),
                "content": message.content,
                "timestamp": timestamp,
            });

            let response = self
                .gateway()
                .make_request::<Value, _>(endpoints::CHAT_HISTORY_CREATE, &payload)
                .await;
            if !response.success {
                warn!(
                    session_id,
                    index,
                    error = response.error_message(),
                    "Failed to insert chat message"
                );
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_helpers::api_db;
    use crate::models::ChatMessage;
    use crate::test_support::RecordingTransport;
    use crate::transport::HttpReply;

    fn history() -> ChatHistory {
        ChatHistory::new(vec![
            ChatMessage::system("you are a trader"),
            ChatMessage::user("market looks hot"),
            ChatMessage::assistant("buy the dip"),
        ])
    }

    #[test]
    fn test_timestamps_cross_minute_boundary() {
        let base = NaiveDateTime::parse_from_str("2024-12-31 23:59:58", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(
            message_timestamps(base, 3),
            vec![
                "2024-12-31 23:59:58",
                "2024-12-31 23:59:59",
                "2025-01-01 00:00:00"
            ]
        );
    }

    #[tokio::test]
    async fn test_messages_written_in_order_with_offsets() {
        let transport = RecordingTransport::new();
        transport.reply_json(endpoints::CHAT_HISTORY_CREATE, 200, json!({}));

        let ok = api_db(&transport)
            .insert_chat_history("s-9", &history(), Some("2024-05-01 12:00:00"))
            .await;
        assert!(ok);

        let bodies = transport.bodies_to(endpoints::CHAT_HISTORY_CREATE);
        assert_eq!(
            bodies,
            vec![
                json!({"session_id": "s-9", "role": "system", "content": "you are a trader", "timestamp": "2024-05-01 12:00:00"}),
                json!({"session_id": "s-9", "role": "user", "content": "market looks hot", "timestamp": "2024-05-01 12:00:01"}),
                json!({"session_id": "s-9", "role": "assistant", "content": "buy the dip", "timestamp": "2024-05-01 12:00:02"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_write_does_not_abort_rest() {
        let transport = RecordingTransport::new();
        transport.reply(endpoints::CHAT_HISTORY_CREATE, HttpReply::new(500, "db down"));
        transport.reply_json(endpoints::CHAT_HISTORY_CREATE, 200, json!({}));

        let ok = api_db(&transport)
            .insert_chat_history("s-9", &history(), Some("2024-05-01 12:00:00"))
            .await;

        assert!(ok);
        assert_eq!(transport.requests_to(endpoints::CHAT_HISTORY_CREATE).len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_base_timestamp_falls_back_to_now() {
        let transport = RecordingTransport::new();
        transport.reply_json(endpoints::CHAT_HISTORY_CREATE, 200, json!({}));

        let before = Utc::now().naive_utc() - Duration::seconds(1);
        api_db(&transport)
            .insert_chat_history("s-9", &history(), Some("01/05/2024 noon"))
            .await;

        let bodies = transport.bodies_to(endpoints::CHAT_HISTORY_CREATE);
        assert_eq!(bodies.len(), 3);
        let first = bodies[0]["timestamp"].as_str().unwrap();
        let first = NaiveDateTime::parse_from_str(first, TIMESTAMP_FORMAT).unwrap();
        assert!(first >= before);
    }

    #[tokio::test]
    async fn test_empty_history_sends_nothing() {
        let transport = RecordingTransport::new();
        assert!(
            api_db(&transport)
                .insert_chat_history("s-9", &ChatHistory::default(), None)
                .await
        );
        assert!(transport.requests().is_empty());
    }
}
