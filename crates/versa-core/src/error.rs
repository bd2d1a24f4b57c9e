//! Error types for the VERSA client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown when no response was received from the backend.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// A shared error type for the entire VERSA client.
///
/// Network failures are split the way the backend contract needs them:
/// no response at all (`Transport`), an error status (`Server`), and the
/// special-cased `401` (`Unauthorized`) that tears the session down.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VersaError {
    /// No response was received (connection refused, DNS, timeout, ...)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The backend answered with an error status
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("request failed"))]
    Server { status: u16, message: Option<String> },

    /// The backend rejected the bearer token (HTTP 401)
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("session expired"))]
    Unauthorized { message: Option<String> },

    /// Input rejected locally before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single-flight rule rejected the call
    #[error("Busy: {0}")]
    Busy(String),

    /// An authenticated operation was attempted without a session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
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

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VersaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a Server error
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::Server { status, message }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Busy error
    pub fn busy(message: impl Into<String>) -> Self {
        Self::Busy(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a transport (no response) error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if this is a 401 error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Check if this is a local validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status of the failure. Transport errors report `0`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { .. } => Some(0),
            Self::Server { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    /// Fills in the per-call default message when the server gave none.
    pub fn with_fallback(self, fallback: &str) -> Self {
        match self {
            Self::Server {
                status,
                message: None,
            } => Self::Server {
                status,
                message: Some(fallback.to_string()),
            },
            Self::Unauthorized { message: None } => Self::Unauthorized {
                message: Some(fallback.to_string()),
            },
            other => other,
        }
    }

    /// Text suitable for showing to the user.
    ///
    /// Server messages win; transport failures map to the connectivity text;
    /// anything without a message of its own uses `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Transport { .. } => CONNECTIVITY_MESSAGE.to_string(),
            Self::Server {
                message: Some(m), ..
            }
            | Self::Unauthorized { message: Some(m) } => m.clone(),
            Self::Validation(m) | Self::Busy(m) => m.clone(),
            _ => fallback.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for VersaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VersaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VersaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for VersaError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, VersaError>`.
pub type Result<T> = std::result::Result<T, VersaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_status_is_zero() {
        let err = VersaError::transport("connection refused");
        assert_eq!(err.status(), Some(0));
        assert_eq!(err.user_message("Login failed"), CONNECTIVITY_MESSAGE);
    }

    #[test]
    fn test_fallback_only_fills_missing_message() {
        let err = VersaError::server(500, None).with_fallback("Failed to create assistant");
        assert_eq!(err.user_message("x"), "Failed to create assistant");

        let err = VersaError::server(400, Some("Email already registered".into()))
            .with_fallback("Registration failed");
        assert_eq!(err.user_message("x"), "Email already registered");
    }

    #[test]
    fn test_unauthorized_predicates() {
        let err = VersaError::Unauthorized { message: None };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message("Session expired"), "Session expired");
    }

    #[test]
    fn test_local_errors_have_no_status() {
        assert_eq!(VersaError::validation("empty").status(), None);
        assert_eq!(VersaError::NotAuthenticated.status(), None);
    }
}
