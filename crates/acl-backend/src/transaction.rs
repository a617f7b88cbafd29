//! Transactions
//!
//! A transaction accumulates set mutations until it is handed to
//! [`Backend::end`](crate::Backend::end).

use uuid::Uuid;

/// A queued set mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Add values to the set under `key`
    Add {
        /// Target bucket
        bucket: String,
        /// Target key
        key: String,
        /// Values to add
        values: Vec<String>,
    },

    /// Remove values from the set under `key`
    Remove {
        /// Target bucket
        bucket: String,
        /// Target key
        key: String,
        /// Values to remove
        values: Vec<String>,
    },

    /// Delete whole keys
    Del {
        /// Target bucket
        bucket: String,
        /// Keys to delete
        keys: Vec<String>,
    },
}

/// A batch of mutations submitted together.
///
/// Operations with no values (or no keys) are dropped when queued, since
/// most stores reject empty `SADD`/`SREM`/`DEL` commands.
///
/// # Example
///
/// ```
/// use acl_backend::Transaction;
///
/// let mut tx = Transaction::new();
/// tx.add("meta", "users", ["u1"])
///     .add("users", "u1", ["admin", "editor"])
///     .remove("roles", "guest", ["u1"]);
///
/// assert_eq!(tx.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Correlation id for logs
    id: Uuid,
    /// Queued operations, applied in order
    ops: Vec<Op>,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            ops: Vec::new(),
        }
    }

    /// Correlation id of this transaction.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue adding `values` to `bucket[key]`.
    pub fn add<I, S>(&mut self, bucket: &str, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.ops.push(Op::Add {
                bucket: bucket.to_string(),
                key: key.to_string(),
                values,
            });
        }
        self
    }

    /// Queue removing `values` from `bucket[key]`.
    pub fn remove<I, S>(&mut self, bucket: &str, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.ops.push(Op::Remove {
                bucket: bucket.to_string(),
                key: key.to_string(),
                values,
            });
        }
        self
    }

    /// Queue deleting `keys` from `bucket`.
    pub fn del<I, S>(&mut self, bucket: &str, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if !keys.is_empty() {
            self.ops.push(Op::Del {
                bucket: bucket.to_string(),
                keys,
            });
        }
        self
    }

    /// Queued operations.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Consume the transaction, yielding its operations.
    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
