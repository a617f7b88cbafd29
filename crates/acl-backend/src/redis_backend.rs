//! Redis-backed store for distributed deployments.
//!
//! Every `(bucket, key)` pair maps to one Redis set named
//! `{prefix}_{bucket}@{key}`. Reads use `SMEMBERS`/`SUNION`; transactions
//! are sent as a single `MULTI/EXEC` pipeline.

use crate::backend::{Backend, BackendError, BackendResult, ValueSet};
use crate::transaction::{Op, Transaction};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Redis backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisBackendConfig {
    /// Redis connection URL (e.g., redis://localhost:6379).
    pub url: String,

    /// Prefix for all Redis keys (default: "acl").
    pub key_prefix: String,
}

impl Default for RedisBackendConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            key_prefix: std::env::var("ACL_REDIS_PREFIX").unwrap_or_else(|_| "acl".to_string()),
        }
    }
}

/// Redis-backed store.
///
/// # Example
///
/// ```rust,no_run
/// use acl_backend::{RedisBackend, RedisBackendConfig};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let config = RedisBackendConfig {
///         url: "redis://localhost:6379".to_string(),
///         key_prefix: "acl".to_string(),
///     };
///     let backend = RedisBackend::new(config).await?;
///     Ok(())
/// }
/// ```
pub struct RedisBackend {
    /// Redis connection manager (reconnects automatically).
    conn: ConnectionManager,

    /// Configuration.
    config: RedisBackendConfig,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("config", &self.config)
            .finish()
    }
}

impl RedisBackend {
    /// Connect to Redis.
    pub async fn new(config: RedisBackendConfig) -> BackendResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| BackendError::ConnectionError(e.to_string()))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| BackendError::ConnectionError(e.to_string()))?;

        tracing::info!(prefix = %config.key_prefix, "Connected Redis ACL backend");

        Ok(Self { conn, config })
    }

    /// Connect with default configuration.
    pub async fn with_defaults() -> BackendResult<Self> {
        Self::new(RedisBackendConfig::default()).await
    }

    /// Redis key holding `bucket[key]`.
    fn bucket_key(&self, bucket: &str, key: &str) -> String {
        format_bucket_key(&self.config.key_prefix, bucket, key)
    }

    fn bucket_keys(&self, bucket: &str, keys: &[String]) -> Vec<String> {
        keys.iter().map(|key| self.bucket_key(bucket, key)).collect()
    }
}

fn format_bucket_key(prefix: &str, bucket: &str, key: &str) -> String {
    format!("{}_{}@{}", prefix, bucket, key)
}

/// Atomic pipeline applying every queued operation of `transaction`.
fn transaction_pipeline(prefix: &str, transaction: &Transaction) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();

    for op in transaction.ops() {
        match op {
            Op::Add { bucket, key, values } => {
                pipe.cmd("SADD")
                    .arg(format_bucket_key(prefix, bucket, key))
                    .arg(values)
                    .ignore();
            }
            Op::Remove { bucket, key, values } => {
                pipe.cmd("SREM")
                    .arg(format_bucket_key(prefix, bucket, key))
                    .arg(values)
                    .ignore();
            }
            Op::Del { bucket, keys } => {
                let keys: Vec<String> = keys
                    .iter()
                    .map(|key| format_bucket_key(prefix, bucket, key))
                    .collect();
                pipe.cmd("DEL").arg(keys).ignore();
            }
        }
    }

    pipe
}

fn command_error(e: RedisError) -> BackendError {
    BackendError::CommandError(e.to_string())
}

#[async_trait]
impl Backend for RedisBackend {
    async fn end(&self, transaction: Transaction) -> BackendResult<()> {
        if transaction.is_empty() {
            return Ok(());
        }

        let pipe = transaction_pipeline(&self.config.key_prefix, &transaction);

        let mut conn = self.conn.clone();
        pipe.query_async::<_, ()>(&mut conn).await.map_err(command_error)?;

        tracing::debug!(
            transaction_id = %transaction.id(),
            ops = transaction.len(),
            "Transaction committed to Redis"
        );

        Ok(())
    }

    async fn clean(&self) -> BackendResult<()> {
        let mut conn = self.conn.clone();

        let pattern = format!("{}_*", self.config.key_prefix);
        let keys: Vec<String> = conn.keys(&pattern).await.map_err(command_error)?;

        if !keys.is_empty() {
            conn.del::<_, ()>(keys).await.map_err(command_error)?;
        }

        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> BackendResult<ValueSet> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn
            .smembers(self.bucket_key(bucket, key))
            .await
            .map_err(command_error)?;
        Ok(members.into_iter().collect())
    }

    async fn union(&self, bucket: &str, keys: &[String]) -> BackendResult<ValueSet> {
        if keys.is_empty() {
            return Ok(ValueSet::new());
        }

        let mut conn = self.conn.clone();
        let members: Vec<String> = conn
            .sunion(self.bucket_keys(bucket, keys))
            .await
            .map_err(command_error)?;
        Ok(members.into_iter().collect())
    }

    fn supports_unions(&self) -> bool {
        true
    }

    async fn unions(
        &self,
        buckets: &[String],
        keys: &[String],
    ) -> BackendResult<HashMap<String, ValueSet>> {
        if keys.is_empty() || buckets.is_empty() {
            return Ok(buckets
                .iter()
                .map(|bucket| (bucket.clone(), ValueSet::new()))
                .collect());
        }

        let mut pipe = redis::pipe();
        for bucket in buckets {
            pipe.cmd("SUNION").arg(self.bucket_keys(bucket, keys));
        }

        let mut conn = self.conn.clone();
        let results: Vec<Vec<String>> = pipe.query_async(&mut conn).await.map_err(command_error)?;

        Ok(buckets
            .iter()
            .cloned()
            .zip(results.into_iter().map(|members| members.into_iter().collect()))
            .collect())
    }
}
