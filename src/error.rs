//! Error types for the statement bot

use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Failures that escape a single webhook invocation.
///
/// Inside a dialogue, bank failures stay [`crate::bank::BankFailure`] values
/// and are rendered to the user; only the digest job escalates them.
#[derive(Error, Debug)]
pub enum BotError {

    // =============================
    // Bot Errors
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat transport error: {0}")]
    Transport(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Bank request failed: {0}")]
    Bank(#[from] crate::bank::BankFailure),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
