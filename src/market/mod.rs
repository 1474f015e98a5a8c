//! Market data and marketing post composition

pub mod coingecko;
pub mod post;

pub use coingecko::{CoinGeckoClient, CoinItem, TrendingCoin, TrendingCoins};
pub use post::{collect_mentions, compose_post, CoinMention, MAX_MENTIONS};
