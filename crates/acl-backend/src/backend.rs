//! Backend contract
//!
//! This module defines the storage abstraction consumed by the ACL engine.
//! Any store that can hold sets of strings under `(bucket, key)` pairs and
//! answer union queries over them can back the engine.

use crate::transaction::Transaction;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// A set of values stored under a single key.
///
/// Ordered so that query results are deterministic across backends.
pub type ValueSet = BTreeSet<String>;

/// Backend error types.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Failed to connect to the store
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The store rejected or failed a command
    #[error("Command error: {0}")]
    CommandError(String),

    /// Optional capability not provided by this backend
    #[error("Operation not supported by backend: {0}")]
    Unsupported(&'static str),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Storage contract for the ACL engine.
///
/// Reads (`get`, `union`, `unions`) go straight to the store. Writes are
/// queued on a [`Transaction`] obtained from [`Backend::begin`] and submitted
/// with [`Backend::end`].
#[async_trait]
pub trait Backend: Send + Sync {
    /// Start a new batch of mutations.
    fn begin(&self) -> Transaction {
        Transaction::new()
    }

    /// Submit a batch of mutations.
    async fn end(&self, transaction: Transaction) -> BackendResult<()>;

    /// Remove every key owned by this backend.
    async fn clean(&self) -> BackendResult<()>;

    /// Get the set stored under `key` in `bucket`.
    ///
    /// Missing keys read as the empty set.
    async fn get(&self, bucket: &str, key: &str) -> BackendResult<ValueSet>;

    /// Union of the sets stored under `keys` in `bucket`.
    async fn union(&self, bucket: &str, keys: &[String]) -> BackendResult<ValueSet>;

    /// Whether [`Backend::unions`] is implemented.
    ///
    /// The engine checks this before preferring the bulk query.
    fn supports_unions(&self) -> bool {
        false
    }

    /// For every bucket, the union of the sets stored under `keys`.
    ///
    /// Every requested bucket is present in the result, mapped to an empty
    /// set when none of the keys exist.
    async fn unions(
        &self,
        buckets: &[String],
        keys: &[String],
    ) -> BackendResult<HashMap<String, ValueSet>> {
        let _ = (buckets, keys);
        Err(BackendError::Unsupported("unions"))
    }
}

/// Backend statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Point reads served
    pub gets: u64,
    /// Union queries served (single-bucket and bulk)
    pub unions: u64,
    /// Transactions applied
    pub transactions: u64,
}
