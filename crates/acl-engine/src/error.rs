//! Error types for ACL operations

use acl_backend::BackendError;
use thiserror::Error;

/// ACL error types.
///
/// A denied permission check is not an error; it is `Ok(false)`.
#[derive(Debug, Error)]
pub enum AclError {
    /// The backend failed; surfaced unchanged
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A compact grant policy could not be parsed
    #[error("Invalid grant policy: {0}")]
    InvalidPolicy(String),
}

/// Result type for ACL operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Check if this error came from the storage layer.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, AclError::Backend(_))
    }
}
