//! Error types for the strategy agent clients

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A backend read the caller cannot proceed without has failed.
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Social post failed: {0}")]
    Social(String),

    #[error("Signature error: {0}")]
    Signature(String),

    #[error("Transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
