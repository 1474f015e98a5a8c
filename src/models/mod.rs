//! Records exchanged with the backend and RAG services

mod chat;
mod lenient;
mod notification;
mod session;
mod strategy;

pub use chat::{ChatHistory, ChatMessage, Role};
pub use notification::{latest_notifications_by_source, Notification, KNOWN_NOTIFICATION_SOURCES};
pub use session::Session;
pub use strategy::{RecordError, StrategyData, StrategyInsertData, StrategyParams};

pub(crate) use strategy::{
    record_owned_by, record_strategy_id, strategy_from_record, StrategyListing,
};
