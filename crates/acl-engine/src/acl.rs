//! The ACL handle
//!
//! [`Acl`] ties a backend to a bucket layout. Its operations are spread over
//! the resolver, evaluator, mutations and compact modules; this module holds
//! construction and direct user/role lookups.

use crate::config::AclOptions;
use crate::error::AclResult;
use crate::schema::BucketNames;
use acl_backend::{Backend, ValueSet};
use std::sync::Arc;

/// Access control list over a shared backend.
///
/// Holds no mutable state of its own; cloning is cheap and clones share the
/// backend.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use acl_engine::{Acl, AclOptions, MemoryBackend};
///
/// let acl = Acl::with_options(Arc::new(MemoryBackend::new()), AclOptions::default());
/// assert_eq!(acl.buckets().users, "users");
/// ```
#[derive(Clone)]
pub struct Acl {
    /// Storage for every relation.
    pub(crate) backend: Arc<dyn Backend>,
    /// Bucket layout.
    options: AclOptions,
}

impl std::fmt::Debug for Acl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acl")
            .field("options", &self.options)
            .field("supports_unions", &self.backend.supports_unions())
            .finish()
    }
}

impl Acl {
    /// Create an ACL with the default bucket layout.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_options(backend, AclOptions::default())
    }

    /// Create an ACL with custom options.
    pub fn with_options(backend: Arc<dyn Backend>, options: AclOptions) -> Self {
        Self { backend, options }
    }

    /// The backend this ACL reads and writes.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Engine options.
    pub fn options(&self) -> &AclOptions {
        &self.options
    }

    /// Bucket layout.
    pub fn buckets(&self) -> &BucketNames {
        &self.options.buckets
    }

    /// Roles directly assigned to a user.
    pub async fn user_roles(&self, user_id: &str) -> AclResult<ValueSet> {
        Ok(self.backend.get(&self.buckets().users, user_id).await?)
    }

    /// Users directly assigned a role.
    pub async fn role_users(&self, role: &str) -> AclResult<ValueSet> {
        Ok(self.backend.get(&self.buckets().roles, role).await?)
    }

    /// Check if a user is directly assigned a role.
    ///
    /// Inherited roles do not count.
    pub async fn has_role(&self, user_id: &str, role: &str) -> AclResult<bool> {
        Ok(self.user_roles(user_id).await?.contains(role))
    }
}
