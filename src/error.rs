//! Error types for the bot population manager
//!
//! Fallible operations return `anyhow` results; the typed variants below are
//! used where callers may want to match on a specific failure.

use crate::types::ClientNum;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for bot management scenarios
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Client {client} is not an active bot")]
    NotABot { client: ClientNum },

    #[error("Invalid userinfo field '{key}': {reason}")]
    InvalidUserInfo { key: String, reason: String },

    #[error("Failed to list player models in '{directory}': {message}")]
    ModelListing { directory: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
