//! Error types for guarded requests
//!
//! A guard turns every non-allowed outcome into one of three errors, each
//! with a fixed HTTP status and a client-safe message.

use acl_engine::AclError;
use serde::Serialize;
use thiserror::Error;

/// Guard error types.
#[derive(Debug, Error)]
pub enum GuardError {
    /// No principal could be resolved for the request
    #[error("User not authenticated")]
    Unauthenticated,

    /// The principal lacks a required permission
    #[error("Insufficient permissions to access resource")]
    Forbidden,

    /// The permission check itself failed
    #[error("Error checking permissions to access resource")]
    Internal(#[source] AclError),
}

/// Result type for guard operations.
pub type GuardResult<T> = Result<T, GuardError>;

/// JSON body for an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// HTTP status code
    pub status: u16,
    /// Machine-readable code
    pub code: &'static str,
    /// Human-readable message
    pub message: String,
}

impl GuardError {
    /// Check if this error should be logged at error level.
    ///
    /// Denials are expected outcomes, not server faults.
    pub fn is_server_error(&self) -> bool {
        matches!(self, GuardError::Internal(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::Unauthenticated => 401,
            GuardError::Forbidden => 403,
            GuardError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            GuardError::Unauthenticated => "UNAUTHENTICATED",
            GuardError::Forbidden => "FORBIDDEN",
            GuardError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Response body for this error.
    ///
    /// Backend details stay out of the body; they are only logged.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status_code(),
            code: self.error_code(),
            message: self.to_string(),
        }
    }

    /// Response body serialized as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.body() })
    }
}
