//! Strategy Agent Client
//!
//! Client-side data access for an autonomous trading/marketing agent:
//! - Strategies, sessions, notifications and chat history in the backend
//!   database API
//! - Strategy storage and semantic retrieval through the RAG service
//! - Trending-coin market data and marketing post composition
//! - OAuth1-signed posting to X
//!
//! # Error Model
//!
//! Reads the agent cannot proceed without return [`Result`]. Everything else
//! logs the failure through `tracing` and returns a neutral value (`false`,
//! `None`, an empty collection or a fallback string).

pub mod config;
pub mod db;
pub mod gateway;
pub mod market;
pub mod models;
pub mod rag;
pub mod social;
pub mod transport;

mod error;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{Config, XCredentials};
pub use db::ApiDb;
pub use error::{Error, Result};
pub use gateway::{ApiResponse, RequestGateway};
pub use models::{ChatHistory, ChatMessage, Notification, Session, StrategyData, StrategyInsertData};
pub use rag::RagClient;
pub use transport::{HttpTransport, ReqwestTransport};
