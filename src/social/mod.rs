//! Social posting

pub mod oauth1;
pub mod x;

pub use oauth1::OAuth1Signer;
pub use x::{PostedTweet, XClient, X_API_BASE_URL};
