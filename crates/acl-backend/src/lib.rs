//! # ACL Backend
//!
//! This crate provides the storage contract for the ACL engine together with
//! the stock backends that implement it.
//!
//! ## Overview
//!
//! The acl-backend crate handles:
//! - **Backend Contract**: Set-valued key/value store grouped into buckets
//! - **Transactions**: Best-effort batches of queued set mutations
//! - **Memory Backend**: In-process store for single-process apps and tests
//! - **Redis Backend**: Shared store for distributed deployments
//!
//! ## Features
//!
//! - `redis`: Redis-backed store (`RedisBackend`)
//!
//! ## Data Layout
//!
//! ```text
//! bucket ──► key ──► { value, value, ... }
//!
//! Examples:
//!   users@u1              = { "admin", "editor" }
//!   parents@admin         = { "editor" }
//!   allows_blogs@admin    = { "get", "put", "delete" }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acl_backend::{Backend, MemoryBackend};
//!
//! async fn example() -> acl_backend::BackendResult<()> {
//!     let backend = MemoryBackend::new();
//!
//!     let mut tx = backend.begin();
//!     tx.add("users", "u1", ["admin"]);
//!     tx.add("roles", "admin", ["u1"]);
//!     backend.end(tx).await?;
//!
//!     let roles = backend.get("users", "u1").await?;
//!     assert!(roles.contains("admin"));
//!     Ok(())
//! }
//! ```
//!
//! ## Atomicity
//!
//! A transaction is submitted as one unit, but the contract only promises a
//! best-effort grouping. The memory backend applies a batch under a single
//! write lock; the Redis backend uses `MULTI/EXEC`. Callers must not assume
//! isolation across separate transactions.

pub mod backend;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_backend;
pub mod transaction;

// Re-export main types
pub use backend::{Backend, BackendError, BackendResult, BackendStats, ValueSet};
pub use memory::MemoryBackend;
pub use transaction::{Op, Transaction};

#[cfg(feature = "redis")]
pub use redis_backend::{RedisBackend, RedisBackendConfig};
