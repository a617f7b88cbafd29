//! Engine configuration.
//!
//! Configuration is loaded from environment variables with defaults that
//! match the standard bucket layout.

use crate::schema::BucketNames;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// ACL engine options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclOptions {
    /// Bucket names used in the backend.
    pub buckets: BucketNames,
}

impl AclOptions {
    /// Load options from environment variables.
    ///
    /// Environment variables:
    /// - `ACL_BUCKET_META` (default: meta)
    /// - `ACL_BUCKET_PARENTS` (default: parents)
    /// - `ACL_BUCKET_RESOURCES` (default: resources)
    /// - `ACL_BUCKET_ROLES` (default: roles)
    /// - `ACL_BUCKET_USERS` (default: users)
    /// - `ACL_ALLOWS_PREFIX` (default: allows_)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = BucketNames::default();
        let read = |key: &str, fallback: String| -> Result<String, ConfigError> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "bucket name must not be empty".to_string(),
                }),
                Some(value) => Ok(value),
                None => Ok(fallback),
            }
        };

        Ok(Self {
            buckets: BucketNames {
                meta: read("ACL_BUCKET_META", default.meta)?,
                parents: read("ACL_BUCKET_PARENTS", default.parents)?,
                resources: read("ACL_BUCKET_RESOURCES", default.resources)?,
                roles: read("ACL_BUCKET_ROLES", default.roles)?,
                users: read("ACL_BUCKET_USERS", default.users)?,
                allows_prefix: read("ACL_ALLOWS_PREFIX", default.allows_prefix)?,
            },
        })
    }
}
