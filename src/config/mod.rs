//! Configuration for the agent clients
//!
//! Non-secret settings come from an optional JSON file and can be
//! overridden from the environment. Secrets are only ever read from the
//! environment (see [`credentials`]).

pub mod credentials;

use crate::models::KNOWN_NOTIFICATION_SOURCES;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use credentials::{api_db_key_from_env, coingecko_key_from_env, XCredentials};

/// Backend base URL environment variable name
pub const API_DB_BASE_URL_ENV: &str = "API_DB_BASE_URL";
/// RAG service base URL environment variable name
pub const RAG_SERVICE_URL_ENV: &str = "RAG_SERVICE_URL";

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend database API base URL
    pub api_db_base_url: String,
    /// RAG service base URL
    pub rag_base_url: String,
    /// RAG request timeout (seconds)
    pub rag_timeout_secs: u64,
    /// Sources requested from the notification feed
    pub notification_sources: Vec<String>,
    /// Notifications per source for the v2 feed
    pub notification_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_db_base_url: "http://localhost:9020/api_v1".to_string(),
            rag_base_url: crate::rag::DEFAULT_RAG_BASE_URL.to_string(),
            rag_timeout_secs: crate::rag::DEFAULT_RAG_TIMEOUT.as_secs(),
            notification_sources: KNOWN_NOTIFICATION_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            notification_limit: 1,
        }
    }
}

impl Config {
    /// Load a JSON config file; fields left out take their defaults
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            crate::Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_DB_BASE_URL_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("Using {} for backend URL", API_DB_BASE_URL_ENV);
            self.api_db_base_url = url;
        }
        if let Some(url) = lookup(RAG_SERVICE_URL_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("Using {} for RAG URL", RAG_SERVICE_URL_ENV);
            self.rag_base_url = url;
        }
        self
    }

    pub fn rag_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.rag_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_db_base_url": "https://db.example.com", "notification_limit": 3}}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api_db_base_url, "https://db.example.com");
        assert_eq!(config.notification_limit, 3);
        assert_eq!(config.rag_base_url, "http://localhost:8080");
        assert_eq!(config.rag_timeout_secs, 5);
        assert_eq!(config.notification_sources.len(), 5);
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (API_DB_BASE_URL_ENV, "https://db.prod"),
            (RAG_SERVICE_URL_ENV, ""),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_db_base_url, "https://db.prod");
        // empty values are ignored
        assert_eq!(config.rag_base_url, "http://localhost:8080");
    }
}
