//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for AptMap
///
/// The `Auth` and `Api` variants preserve the upstream result code and
/// message verbatim so callers can branch on known sentinel codes (for
/// example the `"-401"` stale-token code) without re-deriving them.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum AptMapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: [{code}] {message}")]
    Auth { code: String, message: String },

    #[error("API error: [{code}] {message}")]
    Api { code: String, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Retry budget exhausted after {attempts} attempts: {last_error}")]
    RetryBudgetExhausted { attempts: u32, last_error: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AptMapError {
    /// The upstream result code, when this error carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Auth { code, .. } | Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// True for errors produced by classifying a non-success response
    /// envelope (as opposed to transport or local failures).
    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::Api { .. })
    }
}

/// Result type alias for AptMap operations
pub type Result<T> = std::result::Result<T, AptMapError>;
