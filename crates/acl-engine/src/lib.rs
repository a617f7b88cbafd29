//! # ACL Engine
//!
//! This crate provides hierarchical role-based access control over any
//! store implementing the [`Backend`] contract.
//!
//! ## Overview
//!
//! The acl-engine crate handles:
//! - **Users**: Assignment of roles to user identifiers
//! - **Role Hierarchy**: Roles inherit the permissions of their parents
//! - **Grants**: Permissions (action names) granted to roles on resources
//! - **Queries**: Allow checks and allowed-permission lookups
//!
//! ## Architecture
//!
//! ```text
//! user ──► roles ──► parents ──► parents ...
//!            │          │
//!            ▼          ▼
//!   allows[resource][role] = { "get", "put", "*" }
//! ```
//!
//! All state lives in the backend, under six logical buckets:
//!
//! | Bucket                   | Contents                                   |
//! |--------------------------|--------------------------------------------|
//! | `meta.users`             | every user ever assigned a role            |
//! | `meta.roles`             | every role ever granted or given a parent  |
//! | `users[user]`            | roles assigned to the user                 |
//! | `roles[role]`            | users holding the role                     |
//! | `parents[role]`          | parent roles                               |
//! | `resources[role]`        | resources the role has any permission on   |
//! | `allows_{resource}[role]`| permissions of the role on the resource    |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use acl_engine::{Acl, MemoryBackend};
//!
//! async fn example() -> acl_engine::AclResult<()> {
//!     let acl = Acl::new(Arc::new(MemoryBackend::new()));
//!
//!     acl.allow(&["admin"], &["blogs"], &["get", "put", "delete"]).await?;
//!     acl.add_role_parents("admin", &["member"]).await?;
//!     acl.allow(&["member"], &["forums"], &["get"]).await?;
//!     acl.add_user_roles("u1", &["admin"]).await?;
//!
//!     assert!(acl.is_allowed("u1", "blogs", &["get"]).await?);
//!     assert!(acl.is_allowed("u1", "forums", &["get"]).await?);
//!     assert!(!acl.is_allowed("u1", "blogs", &["post"]).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Wildcard
//!
//! The permission `"*"` grants every action on a resource.
//!
//! ## Consistency
//!
//! Each mutation is submitted as one backend transaction, except revoking
//! permissions, which runs a second batch to prune `resources[role]`.
//! Removing a role does not touch `users[user]` sets: which users hold the
//! role is only known through `roles[role]`, which is dropped with it.

pub mod acl;
pub mod compact;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod mutations;
pub mod permissions;
pub mod resolver;
pub mod schema;

// Re-export main types for convenience
pub use acl::Acl;
pub use compact::{demux, AllowEntry, AllowRule, Grant};
pub use config::{AclOptions, ConfigError};
pub use error::{AclError, AclResult};
pub use permissions::WILDCARD;
pub use schema::BucketNames;

pub use acl_backend::{Backend, BackendError, BackendStats, MemoryBackend, Transaction, ValueSet};

#[cfg(feature = "redis")]
pub use acl_backend::{RedisBackend, RedisBackendConfig};
