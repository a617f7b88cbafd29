//! Role graph resolution
//!
//! Walks `parents` edges breadth-first, one backend union per level. A role
//! is expanded at most once, so a cyclic hierarchy resolves to the finite set
//! of reachable roles instead of looping.

use crate::acl::Acl;
use crate::error::AclResult;
use crate::schema::names;
use acl_backend::ValueSet;

/// Roles of `parents` not seen before, marking them as seen.
pub(crate) fn next_level(parents: ValueSet, visited: &mut ValueSet) -> Vec<String> {
    parents
        .into_iter()
        .filter(|role| visited.insert(role.clone()))
        .collect()
}

impl Acl {
    /// Direct parents of every role in `roles`.
    pub async fn roles_parents<S: AsRef<str>>(&self, roles: &[S]) -> AclResult<ValueSet> {
        let roles = names(roles);
        if roles.is_empty() {
            return Ok(ValueSet::new());
        }

        Ok(self.backend.union(&self.buckets().parents, &roles).await?)
    }

    /// `roles` plus every ancestor reachable through `parents`.
    pub async fn all_roles<S: AsRef<str>>(&self, roles: &[S]) -> AclResult<ValueSet> {
        let mut visited: ValueSet = names(roles).into_iter().collect();
        let mut level: Vec<String> = visited.iter().cloned().collect();

        while !level.is_empty() {
            let parents = self.roles_parents(&level).await?;
            level = next_level(parents, &mut visited);
        }

        Ok(visited)
    }

    /// Every role a user holds, directly or through inheritance.
    pub async fn all_user_roles(&self, user_id: &str) -> AclResult<ValueSet> {
        let roles: Vec<String> = self.user_roles(user_id).await?.into_iter().collect();
        if roles.is_empty() {
            return Ok(ValueSet::new());
        }

        self.all_roles(&roles).await
    }
}
