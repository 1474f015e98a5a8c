//! Marketing post composer

use super::coingecko::{CoinGeckoClient, TrendingCoins};
use chrono::{DateTime, TimeZone};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt::Display;

/// Number of trending coins mentioned in a post
pub const MAX_MENTIONS: usize = 3;

const TEMPLATES: [&str; 5] = [
    "🔥 Today's trending #crypto coins: {coins}. Which one are you most bullish on? #CryptoTrading #Investing",
    "📊 Market watch: {coins} are trending today! What's your price prediction? #Cryptocurrency #Trading",
    "👀 Keep an eye on these trending coins: {coins}. Interesting market movements today! #Crypto #Trading",
    "🚀 Trending on CoinGecko: {coins}. Are you adding any to your portfolio? #CryptoInvesting #Markets",
    "💹 Market intelligence: {coins} showing strong momentum today. Thoughts? #CryptoAnalysis #Trading",
];

/// A coin to mention, with its price when known
#[derive(Debug, Clone, PartialEq)]
pub struct CoinMention {
    pub symbol: String,
    pub price_usd: Option<f64>,
}

impl CoinMention {
    fn render(&self) -> String {
        let symbol = self.symbol.to_uppercase();
        match self.price_usd {
            Some(price) if price != 0.0 => format!("#{} (${:.2})", symbol, price),
            _ => format!("#{}", symbol),
        }
    }
}

/// Price up to [`MAX_MENTIONS`] trending coins
pub async fn collect_mentions(client: &CoinGeckoClient, trending: &TrendingCoins) -> Vec<CoinMention> {
    let mut mentions = Vec::new();
    for coin in trending.coins.iter().take(MAX_MENTIONS) {
        mentions.push(CoinMention {
            symbol: coin.item.symbol.clone(),
            price_usd: client.coin_price_usd(&coin.item.id).await,
        });
    }
    mentions
}

/// Compose a post from up to three mentions, picking a template at random
pub fn compose_post<R, Tz>(mentions: &[CoinMention], rng: &mut R, now: &DateTime<Tz>) -> String
where
    R: Rng + ?Sized,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if mentions.is_empty() {
        return format!(
            "Exploring the crypto markets today! What coins are you watching? #Crypto #Bitcoin #Trading #{}",
            now.format("%A")
        );
    }

    let coins = mentions
        .iter()
        .take(MAX_MENTIONS)
        .map(CoinMention::render)
        .collect::<Vec<_>>()
        .join(", ");

    let template = TEMPLATES.choose(rng).copied().unwrap_or(TEMPLATES[0]);
    format!(
        "{} #CryptoUpdate{}",
        template.replace("{coins}", &coins),
        now.format("%H%M")
    )
}
