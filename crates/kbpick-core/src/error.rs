//! Error types for kbpick.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A precondition of the "index selected" action that was not met.
///
/// These are normally prevented by disabling the action; they only surface
/// when a caller bypasses that guard.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreconditionError {
    #[error("no connection is selected")]
    NoConnection,
    #[error("organization id is not known yet")]
    NoOrganization,
    #[error("no resources are selected")]
    EmptySelection,
    #[error("no knowledge base is open")]
    NoKnowledgeBase,
}

/// A shared error type for the whole kbpick workspace.
///
/// Authentication failures, HTTP failures and precondition failures are kept
/// apart so callers can react differently (authentication errors always mean
/// the session has already been cleared).
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KbPickError {
    /// No token is available for an authenticated call.
    #[error("Authentication required")]
    AuthRequired,

    /// The service answered 401; the session has been cleared.
    #[error("Authentication expired")]
    AuthExpired,

    /// Token endpoint rejected the credentials.
    #[error("Authentication failed")]
    InvalidCredentials,

    /// The login attempt cap was reached; explicit reset is required.
    #[error("Maximum authentication attempts reached ({attempts})")]
    LoginAttemptsExhausted { attempts: u32 },

    /// Non-2xx response other than 401.
    #[error("HTTP error! status: {status}")]
    Http { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, timeout...).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Precondition failed: {0}")]
    Precondition(PreconditionError),

    /// The index action is already in flight.
    #[error("An index operation is already in progress")]
    AlreadySubmitting,

    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KbPickError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// True for every authentication-class error.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired
                | Self::AuthExpired
                | Self::InvalidCredentials
                | Self::LoginAttemptsExhausted { .. }
        )
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::AuthExpired => Some(401),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<PreconditionError> for KbPickError {
    fn from(err: PreconditionError) -> Self {
        Self::Precondition(err)
    }
}

impl From<std::io::Error> for KbPickError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for KbPickError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for KbPickError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for KbPickError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, KbPickError>`.
pub type Result<T> = std::result::Result<T, KbPickError>;
