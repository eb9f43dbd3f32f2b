//! Error types for the Kesher simulator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the simulator core.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The four domain variants
/// (`Validation`, `NotFound`, `State`, `Upstream`) carry the caller-facing
/// failure taxonomy; the rest cover infrastructure faults.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum KesherError {
    /// Malformed or out-of-policy input (empty message, over-long message,
    /// finalizing an empty session). Recoverable by re-prompting the user.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An operation was attempted on a session in the wrong lifecycle state.
    /// This is a caller programming error and is always surfaced.
    #[error("State error: {0}")]
    State(String),

    /// Language-generation provider failure or timeout. The session is left
    /// at its last successful transition; retryable failures may be retried.
    /// `retry_after_secs` carries the provider's `retry-after` hint, if any.
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        retryable: bool,
        #[serde(default)]
        retry_after_secs: Option<u64>,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KesherError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a State error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Creates an Upstream error
    pub fn upstream(message: impl Into<String>, retryable: bool) -> Self {
        Self::Upstream {
            message: message.into(),
            retryable,
            retry_after_secs: None,
        }
    }

    /// Creates a retryable Upstream error carrying the provider's
    /// `retry-after` hint.
    pub fn upstream_throttled(message: impl Into<String>, retry_after_secs: u64) -> Self {
        Self::Upstream {
            message: message.into(),
            retryable: true,
            retry_after_secs: Some(retry_after_secs),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
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

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a State error
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Check if this is an Upstream error
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Check if this error is an upstream failure worth retrying.
    ///
    /// Returns true only for `Upstream` errors whose cause was transient
    /// (connect/timeout failures, 429/5xx responses).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { retryable: true, .. })
    }

    /// The provider's `retry-after` hint, where one was given on a
    /// retryable upstream failure.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Self::Upstream {
                retryable: true,
                retry_after_secs: Some(secs),
                ..
            } => Some(std::time::Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for KesherError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for KesherError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for KesherError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for KesherError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at infrastructure edges)
impl From<anyhow::Error> for KesherError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, KesherError>`.
pub type Result<T> = std::result::Result<T, KesherError>;
