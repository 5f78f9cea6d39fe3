//! Error types for the protolab pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole pipeline.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Every variant renders as a
/// human-readable message, which is what the UI layer shows as a transient
/// notification.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ProtolabError {
    /// A request was rejected before any side effect took place
    /// (empty sequence on generate, no result on download, bad indices).
    #[error("{0}")]
    Validation(String),

    /// A single uploaded input could not be ingested. Never aborts the
    /// rest of the batch.
    #[error("Failed to ingest '{input}': {message}")]
    Ingest { input: String, message: String },

    /// The synthesis service call failed (network error or non-success
    /// HTTP status).
    #[error("Synthesis service error: {message}")]
    Synthesis {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    /// The synthesis service answered, but the payload could not be
    /// decoded into a usable file set.
    #[error("Malformed synthesis response: {0}")]
    MalformedResponse(String),

    /// Zip archive read or write error
    #[error("Archive error: {0}")]
    Archive(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProtolabError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Ingest error for a single named input
    pub fn ingest(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingest {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates a Synthesis error without an HTTP status
    pub fn synthesis(message: impl Into<String>, is_retryable: bool) -> Self {
        Self::Synthesis {
            status_code: None,
            message: message.into(),
            is_retryable,
        }
    }

    /// Creates a MalformedResponse error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates an Archive error
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Synthesis error
    pub fn is_synthesis(&self) -> bool {
        matches!(self, Self::Synthesis { .. })
    }

    /// Check if this error is worth retrying (transient network or
    /// rate-limit conditions reported by the service client).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Synthesis {
                is_retryable: true,
                ..
            }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ProtolabError {
    fn from(err: std::io::Error) -> Self {
        Self::Archive(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for ProtolabError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for ProtolabError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, ProtolabError>`.
pub type Result<T> = std::result::Result<T, ProtolabError>;
