//! Notification feed readers

use super::endpoints;
use super::ApiDb;
use crate::gateway::ApiResponse;
use crate::models::{latest_notifications_by_source, Notification, KNOWN_NOTIFICATION_SOURCES};
use crate::Result;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Returned by [`ApiDb::fetch_latest_notification_str_v2`] whenever the feed
/// cannot be read
pub const NO_NOTIFICATIONS_FALLBACK: &str = "No recent notifications available. Starting fresh.";

#[derive(Debug, Deserialize)]
struct NotificationEnvelope {
    data: Vec<Notification>,
}

impl ApiDb {
    /// Newest notification of every source, one `short_desc` per line.
    ///
    /// The whole feed is fetched; `sources` is only recorded in the logs.
    /// Fails when the feed cannot be fetched or decoded.
    pub async fn fetch_latest_notification_str(&self, sources: &[String]) -> Result<String> {
        debug!(?sources, "Fetching latest notifications");

        let envelope: NotificationEnvelope = self
            .gateway()
            .make_request(endpoints::NOTIFICATION_GET, &json!({}))
            .await
            .into_result("Failed to fetch notifications")?;

        let lines: Vec<&str> = latest_notifications_by_source(&envelope.data)
            .into_iter()
            .map(|n| n.short_desc.as_str())
            .collect();

        Ok(lines.join("\n"))
    }

    /// Distinct `long_desc` values of the newest `limit` notifications per
    /// source, one per line. Unknown sources are warned about but still
    /// requested. Never fails: any error yields [`NO_NOTIFICATIONS_FALLBACK`].
    pub async fn fetch_latest_notification_str_v2(&self, sources: &[String], limit: u32) -> String {
        for source in sources {
            if !KNOWN_NOTIFICATION_SOURCES.contains(&source.as_str()) {
                warn!(source = %source, "Unexpected notification source");
            }
        }

        let response: ApiResponse<NotificationEnvelope> = self
            .gateway()
            .make_request(
                endpoints::NOTIFICATION_GET_V3,
                &json!({ "limit": limit, "sources": sources }),
            )
            .await;

        let ApiResponse { data, error, .. } = response;
        let Some(envelope) = data else {
            warn!(error = error.as_deref(), "Failed to fetch notifications");
            return NO_NOTIFICATIONS_FALLBACK.to_string();
        };

        let distinct: BTreeSet<&str> = envelope.data.iter().map(|n| n.long_desc.as_str()).collect();
        distinct.into_iter().collect::<Vec<_>>().join("\n")
    }
}
