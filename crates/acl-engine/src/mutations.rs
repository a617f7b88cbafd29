//! Policy mutations
//!
//! Every operation here queues its writes on one backend transaction, except
//! permission revocation, which needs a second pass to prune
//! `resources[role]`. None of the multi-step operations are atomic with
//! respect to concurrent writers.

use crate::acl::Acl;
use crate::error::{AclError, AclResult};
use crate::schema::{names, META_ROLES, META_USERS};
use futures::future::try_join_all;

impl Acl {
    /// Assign roles to a user.
    pub async fn add_user_roles<S: AsRef<str>>(&self, user_id: &str, roles: &[S]) -> AclResult<()> {
        let roles = names(roles);
        let buckets = self.buckets();

        let mut tx = self.backend.begin();
        tx.add(&buckets.meta, META_USERS, [user_id]);
        tx.add(&buckets.users, user_id, roles.iter().cloned());
        for role in &roles {
            tx.add(&buckets.roles, role, [user_id]);
        }
        self.backend.end(tx).await?;

        tracing::debug!(user_id = %user_id, roles = ?roles, "Assigned roles to user");
        Ok(())
    }

    /// Unassign roles from a user.
    pub async fn remove_user_roles<S: AsRef<str>>(
        &self,
        user_id: &str,
        roles: &[S],
    ) -> AclResult<()> {
        let roles = names(roles);
        let buckets = self.buckets();

        let mut tx = self.backend.begin();
        tx.remove(&buckets.users, user_id, roles.iter().cloned());
        for role in &roles {
            tx.remove(&buckets.roles, role, [user_id]);
        }
        self.backend.end(tx).await?;

        tracing::debug!(user_id = %user_id, roles = ?roles, "Unassigned roles from user");
        Ok(())
    }

    /// Make `role` inherit from `parents`.
    ///
    /// Nothing prevents cycles; resolution tolerates them, but a cycle makes
    /// every role on it equivalent.
    pub async fn add_role_parents<S: AsRef<str>>(&self, role: &str, parents: &[S]) -> AclResult<()> {
        let parents = names(parents);
        let buckets = self.buckets();

        let mut tx = self.backend.begin();
        tx.add(&buckets.meta, META_ROLES, [role]);
        tx.add(&buckets.parents, role, parents.iter().cloned());
        self.backend.end(tx).await?;

        tracing::debug!(role = %role, parents = ?parents, "Added role parents");
        Ok(())
    }

    /// Remove some parents of `role`.
    pub async fn remove_role_parents<S: AsRef<str>>(
        &self,
        role: &str,
        parents: &[S],
    ) -> AclResult<()> {
        let parents = names(parents);

        let mut tx = self.backend.begin();
        tx.remove(&self.buckets().parents, role, parents.iter().cloned());
        self.backend.end(tx).await?;

        tracing::debug!(role = %role, parents = ?parents, "Removed role parents");
        Ok(())
    }

    /// Remove every parent of `role`.
    pub async fn remove_all_role_parents(&self, role: &str) -> AclResult<()> {
        let mut tx = self.backend.begin();
        tx.del(&self.buckets().parents, [role]);
        self.backend.end(tx).await?;

        tracing::debug!(role = %role, "Removed all role parents");
        Ok(())
    }

    /// Grant `permissions` on every resource to every role.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use acl_engine::{Acl, MemoryBackend};
    ///
    /// async fn example() -> acl_engine::AclResult<()> {
    ///     let acl = Acl::new(Arc::new(MemoryBackend::new()));
    ///     acl.allow(&["admin", "editor"], &["blogs", "news"], &["get", "put"]).await?;
    ///     acl.allow(&["root"], &["blogs"], &["*"]).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn allow<R, S, P>(&self, roles: &[R], resources: &[S], permissions: &[P]) -> AclResult<()>
    where
        R: AsRef<str>,
        S: AsRef<str>,
        P: AsRef<str>,
    {
        let roles = names(roles);
        let resources = names(resources);
        let permissions = names(permissions);
        let buckets = self.buckets();

        let mut tx = self.backend.begin();
        tx.add(&buckets.meta, META_ROLES, roles.iter().cloned());

        for resource in &resources {
            let bucket = buckets.allows_bucket(resource);
            for role in &roles {
                tx.add(&bucket, role, permissions.iter().cloned());
            }
        }

        for role in &roles {
            tx.add(&buckets.resources, role, resources.iter().cloned());
        }

        self.backend.end(tx).await?;

        tracing::debug!(
            roles = ?roles,
            resources = ?resources,
            permissions = ?permissions,
            "Granted permissions"
        );
        Ok(())
    }

    /// Revoke some permissions of `role` on `resources`.
    ///
    /// A resource left with no permissions for the role is dropped from
    /// `resources[role]` in a second batch.
    pub async fn remove_allow<S, P>(&self, role: &str, resources: &[S], permissions: &[P]) -> AclResult<()>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        self.remove_permissions(role, names(resources), Some(names(permissions)))
            .await
    }

    /// Revoke every permission of `role` on `resources`.
    pub async fn remove_allow_all<S: AsRef<str>>(&self, role: &str, resources: &[S]) -> AclResult<()> {
        self.remove_permissions(role, names(resources), None).await
    }

    async fn remove_permissions(
        &self,
        role: &str,
        resources: Vec<String>,
        permissions: Option<Vec<String>>,
    ) -> AclResult<()> {
        let buckets = self.buckets();

        let mut tx = self.backend.begin();
        for resource in &resources {
            let bucket = buckets.allows_bucket(resource);
            match &permissions {
                Some(permissions) => {
                    tx.remove(&bucket, role, permissions.iter().cloned());
                }
                None => {
                    tx.del(&bucket, [role]);
                    tx.remove(&buckets.resources, role, [resource.as_str()]);
                }
            }
        }
        self.backend.end(tx).await?;

        // Not atomic with the batch above; a concurrent grant can race the prune.
        let lookups = resources.iter().map(|resource| async move {
            let left = self
                .backend
                .get(&buckets.allows_bucket(resource), role)
                .await?;
            Ok::<_, AclError>((resource, left.is_empty()))
        });
        let emptied: Vec<&String> = try_join_all(lookups)
            .await?
            .into_iter()
            .filter_map(|(resource, empty)| empty.then_some(resource))
            .collect();

        let mut tx = self.backend.begin();
        tx.remove(&buckets.resources, role, emptied.iter().map(|r| r.as_str()));
        self.backend.end(tx).await?;

        tracing::debug!(
            role = %role,
            resources = ?resources,
            permissions = ?permissions,
            "Revoked permissions"
        );
        Ok(())
    }

    /// Delete a role and every grant and parent edge it has.
    ///
    /// Users keep the role in `users[user]`.
    pub async fn remove_role(&self, role: &str) -> AclResult<()> {
        let buckets = self.buckets();
        let resources = self.backend.get(&buckets.resources, role).await?;

        let mut tx = self.backend.begin();
        for resource in &resources {
            tx.del(&buckets.allows_bucket(resource), [role]);
        }
        tx.del(&buckets.resources, [role]);
        tx.del(&buckets.parents, [role]);
        tx.del(&buckets.roles, [role]);
        tx.remove(&buckets.meta, META_ROLES, [role]);
        self.backend.end(tx).await?;

        tracing::debug!(role = %role, resources = resources.len(), "Removed role");
        Ok(())
    }

    /// Delete every grant on a resource.
    pub async fn remove_resource(&self, resource: &str) -> AclResult<()> {
        let buckets = self.buckets();
        let roles = self.backend.get(&buckets.meta, META_ROLES).await?;

        let mut tx = self.backend.begin();
        tx.del(&buckets.allows_bucket(resource), roles.iter().cloned());
        for role in &roles {
            tx.remove(&buckets.resources, role, [resource]);
        }
        self.backend.end(tx).await?;

        tracing::debug!(resource = %resource, roles = roles.len(), "Removed resource");
        Ok(())
    }
}
