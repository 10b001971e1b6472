//! Error types and handling
//!
//! This module provides the error taxonomy used throughout the Menubot engine.
//! All errors implement the `BotErrorExt` trait which provides a user-facing
//! hint and indicates whether the conversation can continue after the error.
//!
//! # Security
//!
//! Hints are static strings. They never echo storage paths, database errors
//! or the dashboard key back to a WhatsApp user.

use thiserror::Error;

/// Trait for Menubot error extensions
///
/// Every engine error can be turned into a short message that is safe to send
/// back to the customer over the messaging transport.
pub trait BotErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain:
    /// - Secrets (dashboard key)
    /// - File paths or database details
    /// - Internal implementation details
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors are resolved by the user resending a message.
    /// Non-recoverable errors need operator attention (bad config, broken disk).
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Conversation**: `InvalidInput`, `NotFound` (re-prompt in the same state)
/// - **Storage**: order persistence failed, session kept for retry
/// - **Access**: dashboard key mismatch
/// - **Configuration**: invalid or unreadable config file
///
/// # Examples
///
/// ```
/// use sdk::errors::{BotError, BotErrorExt};
///
/// let error = BotError::NotFound("item 'pizza'".to_string());
/// assert!(error.is_recoverable());
///
/// let fatal = BotError::Config("bad port".to_string());
/// assert!(!fatal.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum BotError {
    // Conversation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Order persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Dashboard access
    #[error("Unauthorized")]
    Unauthorized,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotErrorExt for BotError {
    fn user_hint(&self) -> &str {
        match self {
            Self::InvalidInput(_) => "Please use the options above 👆",
            Self::NotFound(_) => "That option is not available. Please pick one from the list",
            Self::Storage(_) | Self::Io(_) | Self::Serialization(_) => {
                "⚠️ We couldn't place your order right now. Please choose a payment method again to retry"
            }
            Self::Unauthorized => "Access denied",
            Self::Config(_) => "The restaurant bot is misconfigured. Please try again later",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            _ => true,
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
