//! CoinGecko public API client
//!
//! Market data is a soft dependency: every failure is logged and degrades
//! to an empty list or a missing price.

use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
/// Header carrying the optional pro API key
pub const COINGECKO_API_KEY_HEADER: &str = "x-cg-pro-api-key";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    #[serde(default)]
    pub item: CoinItem,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoins {
    #[serde(default)]
    pub coins: Vec<TrendingCoin>,
}

pub struct CoinGeckoClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<SecretString>,
}

impl CoinGeckoClient {
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self::with_transport(COINGECKO_BASE_URL, api_key, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Trending coins; empty when the request fails
    pub async fn trending_coins(&self) -> TrendingCoins {
        let url = format!("{}/search/trending", self.base_url.trim_end_matches('/'));
        self.get_json::<TrendingCoins>(&url, "trending coins")
            .await
            .unwrap_or_default()
    }

    /// Current USD price of `coin_id`
    pub async fn coin_price_usd(&self, coin_id: &str) -> Option<f64> {
        if coin_id.is_empty() {
            return None;
        }
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(coin_id)
        );
        let prices: Value = self.get_json(&url, "coin price").await?;
        prices.get(coin_id)?.get("usd")?.as_f64()
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Option<T> {
        let mut request = HttpRequest::get(url);
        if let Some(key) = &self.api_key {
            request = request.with_header(COINGECKO_API_KEY_HEADER, key.expose_secret());
        }

        let reply = match self.transport.send(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Error fetching {}", what);
                return None;
            }
        };
        if reply.status != 200 {
            warn!(status = reply.status, body = %reply.body, "Error fetching {}", what);
            return None;
        }

        serde_json::from_str(&reply.body)
            .map_err(|e| warn!(error = %e, "Malformed {} response", what))
            .ok()
    }
}
