//! Permission evaluation
//!
//! Answers "which permissions" and "is it allowed" questions by combining
//! per-resource permission buckets with the role hierarchy.

use crate::acl::Acl;
use crate::error::{AclError, AclResult};
use crate::permissions::{grants_all, shares_any, unmet};
use crate::resolver::next_level;
use crate::schema::names;
use acl_backend::ValueSet;
use futures::future::try_join_all;
use std::collections::BTreeMap;

impl Acl {
    /// Permissions `roles` and their ancestors hold on `resource`.
    pub async fn resource_permissions<S: AsRef<str>>(
        &self,
        roles: &[S],
        resource: &str,
    ) -> AclResult<ValueSet> {
        let bucket = self.buckets().allows_bucket(resource);
        let mut visited: ValueSet = names(roles).into_iter().collect();
        let mut level: Vec<String> = visited.iter().cloned().collect();
        let mut permissions = ValueSet::new();

        while !level.is_empty() {
            permissions.extend(self.backend.union(&bucket, &level).await?);
            let parents = self.roles_parents(&level).await?;
            level = next_level(parents, &mut visited);
        }

        Ok(permissions)
    }

    /// Check if a user may perform every one of `permissions` on `resource`.
    ///
    /// A user without roles is denied without any permission lookup.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use acl_engine::{Acl, MemoryBackend};
    ///
    /// async fn example() -> acl_engine::AclResult<()> {
    ///     let acl = Acl::new(Arc::new(MemoryBackend::new()));
    ///     acl.allow(&["admin"], &["blogs"], &["get", "put", "delete"]).await?;
    ///     acl.add_user_roles("u1", &["admin"]).await?;
    ///
    ///     assert!(acl.is_allowed("u1", "blogs", &["get", "put"]).await?);
    ///     assert!(!acl.is_allowed("u1", "blogs", &["post"]).await?);
    ///     Ok(())
    /// }
    /// ```
    pub async fn is_allowed<S: AsRef<str>>(
        &self,
        user_id: &str,
        resource: &str,
        permissions: &[S],
    ) -> AclResult<bool> {
        let roles: Vec<String> = self.user_roles(user_id).await?.into_iter().collect();
        if roles.is_empty() {
            return Ok(false);
        }

        self.check_permissions(roles, resource, names(permissions)).await
    }

    /// Check if any of `roles` (or their ancestors) may perform every one of
    /// `permissions` on `resource`.
    pub async fn are_any_roles_allowed<R, P>(
        &self,
        roles: &[R],
        resource: &str,
        permissions: &[P],
    ) -> AclResult<bool>
    where
        R: AsRef<str>,
        P: AsRef<str>,
    {
        let roles = names(roles);
        if roles.is_empty() {
            return Ok(false);
        }

        self.check_permissions(roles, resource, names(permissions)).await
    }

    /// Level-by-level check: each level of the hierarchy only has to cover
    /// what the levels below it left unmet.
    async fn check_permissions(
        &self,
        roles: Vec<String>,
        resource: &str,
        permissions: Vec<String>,
    ) -> AclResult<bool> {
        let bucket = self.buckets().allows_bucket(resource);
        let mut visited: ValueSet = roles.iter().cloned().collect();
        let mut level = roles;
        let mut remaining = permissions;

        loop {
            let granted = self.backend.union(&bucket, &level).await?;
            if grants_all(&granted) {
                return Ok(true);
            }

            remaining = unmet(&remaining, &granted);
            if remaining.is_empty() {
                return Ok(true);
            }

            let parents = self.roles_parents(&level).await?;
            level = next_level(parents, &mut visited);
            if level.is_empty() {
                return Ok(false);
            }
        }
    }

    /// Permissions a user holds on each of `resources`, inherited ones
    /// included.
    ///
    /// Uses a single bulk query when the backend supports it.
    pub async fn allowed_permissions<S: AsRef<str>>(
        &self,
        user_id: &str,
        resources: &[S],
    ) -> AclResult<BTreeMap<String, ValueSet>> {
        if user_id.is_empty() {
            return Ok(BTreeMap::new());
        }

        if self.backend.supports_unions() {
            return self.optimized_allowed_permissions(user_id, resources).await;
        }

        let resources = names(resources);
        let roles: Vec<String> = self.all_user_roles(user_id).await?.into_iter().collect();
        let roles = &roles;

        let lookups = resources.iter().map(|resource| async move {
            let permissions = self.resource_permissions(roles, resource).await?;
            Ok::<_, AclError>((resource.clone(), permissions))
        });

        Ok(try_join_all(lookups).await?.into_iter().collect())
    }

    /// Bulk-query form of [`Acl::allowed_permissions`].
    ///
    /// Resolves the user's full role set first, then asks the backend for
    /// the union of every permission bucket in one call. Requires a backend
    /// with `unions` support.
    pub async fn optimized_allowed_permissions<S: AsRef<str>>(
        &self,
        user_id: &str,
        resources: &[S],
    ) -> AclResult<BTreeMap<String, ValueSet>> {
        if user_id.is_empty() {
            return Ok(BTreeMap::new());
        }

        let resources = names(resources);
        let roles: Vec<String> = self.all_user_roles(user_id).await?.into_iter().collect();

        if roles.is_empty() {
            return Ok(resources
                .into_iter()
                .map(|resource| (resource, ValueSet::new()))
                .collect());
        }

        let buckets = self.buckets();
        let allows: Vec<String> = resources
            .iter()
            .map(|resource| buckets.allows_bucket(resource))
            .collect();

        let response = self.backend.unions(&allows, &roles).await?;

        Ok(response
            .into_iter()
            .map(|(bucket, permissions)| {
                (buckets.key_from_allows_bucket(&bucket).to_string(), permissions)
            })
            .collect())
    }

    /// Resources on which `roles` or their ancestors hold any permission.
    pub async fn roles_resources<S: AsRef<str>>(&self, roles: &[S]) -> AclResult<ValueSet> {
        let roles: Vec<String> = self.all_roles(roles).await?.into_iter().collect();
        if roles.is_empty() {
            return Ok(ValueSet::new());
        }

        Ok(self.backend.union(&self.buckets().resources, &roles).await?)
    }

    /// Every resource `roles` can act on, with the permissions held on it.
    pub async fn what_resources<S: AsRef<str>>(
        &self,
        roles: &[S],
    ) -> AclResult<BTreeMap<String, ValueSet>> {
        let roles = names(roles);
        let resources = self.roles_resources(&roles).await?;
        let roles = &roles;

        let lookups = resources.iter().map(|resource| async move {
            let permissions = self.resource_permissions(roles, resource).await?;
            Ok::<_, AclError>((resource.clone(), permissions))
        });

        Ok(try_join_all(lookups).await?.into_iter().collect())
    }

    /// Resources on which `roles` hold at least one of `permissions`.
    ///
    /// Matching is by name; a `"*"` grant only matches a requested `"*"`.
    pub async fn what_resources_with<R, P>(
        &self,
        roles: &[R],
        permissions: &[P],
    ) -> AclResult<ValueSet>
    where
        R: AsRef<str>,
        P: AsRef<str>,
    {
        let requested = names(permissions);

        Ok(self
            .what_resources(roles)
            .await?
            .into_iter()
            .filter(|(_, granted)| shares_any(&requested, granted))
            .map(|(resource, _)| resource)
            .collect())
    }
}
