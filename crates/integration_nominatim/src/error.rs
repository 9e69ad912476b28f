//! Geocoding error types

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Shared, type-erased cause of a transport failure
pub type ErrorSource = Arc<dyn StdError + Send + Sync>;

/// Errors that can occur during geocoding operations
///
/// "No match" is not an error: searches return an empty list and
/// `reverse` returns `None`.
#[derive(Debug, Clone, Error)]
pub enum NominatimError {
    /// The request was rejected before any network activity
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP failure, non-2xx status, undecodable body or unexpected payload shape
    #[error("{message}")]
    Transport {
        /// Human-readable description including the cause
        message: String,
        /// Underlying error, when there is one
        #[source]
        source: Option<ErrorSource>,
    },

    /// The client could not be built from its configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl NominatimError {
    /// Transport error without an underlying cause
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Transport error wrapping its cause; the message reads `"{context}: {cause}"`
    pub fn transport_caused_by<E>(context: &str, cause: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let cause: Box<dyn StdError + Send + Sync> = cause.into();
        Self::Transport {
            message: format!("{context}: {cause}"),
            source: Some(Arc::from(cause)),
        }
    }

    /// Returns true if repeating the same request may succeed
    ///
    /// The client never retries on its own; this is a hint for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns true for input rejected before any network activity
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
