//! In-memory backend
//!
//! Suitable for single-process applications and testing. For deployments
//! with several application instances, use the Redis backend.

use crate::backend::{Backend, BackendResult, BackendStats, ValueSet};
use crate::transaction::{Op, Transaction};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

type Buckets = HashMap<String, HashMap<String, ValueSet>>;

/// In-memory backend implementation.
///
/// A transaction is applied under a single write lock, so batches are
/// atomic with respect to other callers of the same instance.
pub struct MemoryBackend {
    /// bucket -> key -> values
    buckets: RwLock<Buckets>,
    /// Statistics
    gets: AtomicU64,
    unions: AtomicU64,
    transactions: AtomicU64,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("stats", &self.stats())
            .finish()
    }
}

impl MemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            gets: AtomicU64::new(0),
            unions: AtomicU64::new(0),
            transactions: AtomicU64::new(0),
        }
    }

    /// Get backend statistics.
    pub fn stats(&self) -> BackendStats {
        BackendStats {
            gets: self.gets.load(Ordering::Relaxed),
            unions: self.unions.load(Ordering::Relaxed),
            transactions: self.transactions.load(Ordering::Relaxed),
        }
    }

    fn apply(buckets: &mut Buckets, op: Op) {
        match op {
            Op::Add { bucket, key, values } => {
                buckets
                    .entry(bucket)
                    .or_default()
                    .entry(key)
                    .or_default()
                    .extend(values);
            }
            Op::Remove { bucket, key, values } => {
                if let Some(entries) = buckets.get_mut(&bucket) {
                    if let Some(set) = entries.get_mut(&key) {
                        for value in &values {
                            set.remove(value);
                        }
                        // Empty sets read the same as missing keys
                        if set.is_empty() {
                            entries.remove(&key);
                        }
                    }
                }
            }
            Op::Del { bucket, keys } => {
                if let Some(entries) = buckets.get_mut(&bucket) {
                    for key in &keys {
                        entries.remove(key);
                    }
                }
            }
        }
    }

    fn union_of(buckets: &Buckets, bucket: &str, keys: &[String]) -> ValueSet {
        let mut result = ValueSet::new();
        if let Some(entries) = buckets.get(bucket) {
            for key in keys {
                if let Some(set) = entries.get(key) {
                    result.extend(set.iter().cloned());
                }
            }
        }
        result
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn end(&self, transaction: Transaction) -> BackendResult<()> {
        let id = transaction.id();
        let ops = transaction.len();

        {
            let mut buckets = self.buckets.write().await;
            for op in transaction.into_ops() {
                Self::apply(&mut buckets, op);
            }
        }

        self.transactions.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(transaction_id = %id, ops, "Applied transaction to memory backend");

        Ok(())
    }

    async fn clean(&self) -> BackendResult<()> {
        self.buckets.write().await.clear();
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> BackendResult<ValueSet> {
        self.gets.fetch_add(1, Ordering::Relaxed);

        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(bucket)
            .and_then(|entries| entries.get(key))
            .cloned()
            .unwrap_or_default())
    }

    async fn union(&self, bucket: &str, keys: &[String]) -> BackendResult<ValueSet> {
        self.unions.fetch_add(1, Ordering::Relaxed);

        let buckets = self.buckets.read().await;
        Ok(Self::union_of(&buckets, bucket, keys))
    }

    fn supports_unions(&self) -> bool {
        true
    }

    async fn unions(
        &self,
        buckets: &[String],
        keys: &[String],
    ) -> BackendResult<HashMap<String, ValueSet>> {
        self.unions.fetch_add(1, Ordering::Relaxed);

        let store = self.buckets.read().await;
        Ok(buckets
            .iter()
            .map(|bucket| (bucket.clone(), Self::union_of(&store, bucket, keys)))
            .collect())
    }
}
