//! Notification feed records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Sources the backend is known to ingest
pub const KNOWN_NOTIFICATION_SOURCES: [&str; 5] = [
    "twitter_mentions",
    "twitter_feed",
    "crypto_news_bitcoin_magazine",
    "crypto_news_cointelegraph",
    "coingecko",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub long_desc: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keep the newest notification of each source.
///
/// Newest means greatest `created_at`; among equal or missing timestamps the
/// entry appearing later in the feed wins. The result is ordered by each
/// source's first appearance in `notifications`.
pub fn latest_notifications_by_source(notifications: &[Notification]) -> Vec<&Notification> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &Notification> = HashMap::new();

    for notification in notifications {
        let source = notification.source.as_str();
        match latest.get(source) {
            Some(current) if current.created_at > notification.created_at => {}
            Some(_) => {
                latest.insert(source, notification);
            }
            None => {
                order.push(source);
                latest.insert(source, notification);
            }
        }
    }

    order.into_iter().filter_map(|s| latest.get(s).copied()).collect()
}
