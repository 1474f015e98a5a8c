//! Credentials read from the environment
//!
//! ```bash
//! export API_DB_API_KEY="..."            # backend API (required for DB commands)
//! export COINGECKO_API_KEY="..."         # optional, raises market-data rate limits
//! export TWITTER_API_KEY="..."           # the four X values are all required to post
//! export TWITTER_API_KEY_SECRET="..."
//! export TWITTER_ACCESS_TOKEN="..."
//! export TWITTER_ACCESS_TOKEN_SECRET="..."
//! ```

use crate::{Error, Result};
use secrecy::SecretString;

pub const API_DB_API_KEY_ENV: &str = "API_DB_API_KEY";
pub const COINGECKO_API_KEY_ENV: &str = "COINGECKO_API_KEY";
pub const TWITTER_API_KEY_ENV: &str = "TWITTER_API_KEY";
pub const TWITTER_API_KEY_SECRET_ENV: &str = "TWITTER_API_KEY_SECRET";
pub const TWITTER_ACCESS_TOKEN_ENV: &str = "TWITTER_ACCESS_TOKEN";
pub const TWITTER_ACCESS_TOKEN_SECRET_ENV: &str = "TWITTER_ACCESS_TOKEN_SECRET";

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<SecretString> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

/// Backend API key; required
pub fn api_db_key_from_env() -> Result<SecretString> {
    non_empty(&env_lookup, API_DB_API_KEY_ENV)
        .ok_or_else(|| Error::MissingCredentials(API_DB_API_KEY_ENV.to_string()))
}

/// Market-data API key; optional
pub fn coingecko_key_from_env() -> Option<SecretString> {
    non_empty(&env_lookup, COINGECKO_API_KEY_ENV)
}

/// OAuth1 user-context credentials for posting to X
#[derive(Debug, Clone)]
pub struct XCredentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub access_token: SecretString,
    pub access_token_secret: SecretString,
}

impl XCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Build from an arbitrary variable lookup. Every value is required;
    /// the error names all missing variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let names = [
            TWITTER_API_KEY_ENV,
            TWITTER_API_KEY_SECRET_ENV,
            TWITTER_ACCESS_TOKEN_ENV,
            TWITTER_ACCESS_TOKEN_SECRET_ENV,
        ];
        let values: Vec<Option<SecretString>> =
            names.iter().map(|name| non_empty(&lookup, name)).collect();

        let missing: Vec<&str> = names
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingCredentials(missing.join(", ")));
        }

        let [consumer_key, consumer_secret, access_token, access_token_secret]: [SecretString; 4] =
            values
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .try_into()
                .map_err(|_| Error::MissingCredentials(missing.join(", ")))?;
        Ok(Self {
            consumer_key,
            consumer_secret,
            access_token,
            access_token_secret,
        })
    }
}
