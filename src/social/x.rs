//! X (Twitter) v2 posting client

use super::oauth1::OAuth1Signer;
use crate::config::XCredentials;
use crate::transport::{HttpRequest, HttpTransport, Method, ReqwestTransport};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

pub const X_API_BASE_URL: &str = "https://api.twitter.com";
const TWEETS_PATH: &str = "2/tweets";

/// A successfully created post
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostedTweet {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize)]
struct TweetEnvelope {
    #[serde(default)]
    data: PostedTweet,
}

pub struct XClient {
    transport: Arc<dyn HttpTransport>,
    signer: OAuth1Signer,
    base_url: String,
}

impl XClient {
    pub fn new(credentials: XCredentials) -> Self {
        Self::with_transport(X_API_BASE_URL, credentials, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        base_url: impl Into<String>,
        credentials: XCredentials,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            signer: OAuth1Signer::new(credentials),
            base_url: base_url.into(),
        }
    }

    /// Publish `text`. Only 200 and 201 count as success.
    pub async fn post_text(&self, text: &str) -> Result<PostedTweet> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), TWEETS_PATH);
        let authorization = self.signer.authorization(Method::Post.as_str(), &url, &[])?;

        let request = HttpRequest::post_json(&url, json!({ "text": text }))
            .with_header("Authorization", authorization)
            .with_header("Content-Type", "application/json");

        let reply = self.transport.send(request).await?;
        if !matches!(reply.status, 200 | 201) {
            error!(status = reply.status, body = %reply.body, "Failed to post tweet");
            return Err(Error::Social(format!(
                "HTTP {}: {}",
                reply.status, reply.body
            )));
        }

        let envelope: TweetEnvelope = serde_json::from_str(&reply.body)?;
        info!(tweet_id = envelope.data.id.as_deref(), "Posted tweet");
        Ok(envelope.data)
    }
}
