//! End-to-end policy scenarios.
//!
//! These tests drive the public `Acl` surface against the memory backend and
//! against a wrapper that hides the bulk `unions` query, so both
//! `allowed_permissions` strategies are covered.
//!
//! Scenarios:
//! 1. Grant/revoke round trip and idempotent grants
//! 2. Inheritance through parent roles, and losing it on revoke
//! 3. Wildcard grants
//! 4. Users without roles
//! 5. Role and resource deletion
//! 6. Failing backends
//! 7. Compact policies that fail part-way

use acl_engine::{
    Acl, AclError, AllowRule, Backend, BackendError, MemoryBackend, Transaction, ValueSet,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Memory backend that does not advertise `unions`.
struct PlainBackend(MemoryBackend);

#[async_trait]
impl Backend for PlainBackend {
    async fn end(&self, transaction: Transaction) -> Result<(), BackendError> {
        self.0.end(transaction).await
    }

    async fn clean(&self) -> Result<(), BackendError> {
        self.0.clean().await
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ValueSet, BackendError> {
        self.0.get(bucket, key).await
    }

    async fn union(&self, bucket: &str, keys: &[String]) -> Result<ValueSet, BackendError> {
        self.0.union(bucket, keys).await
    }
}

/// Backend whose every call fails.
struct BrokenBackend;

#[async_trait]
impl Backend for BrokenBackend {
    async fn end(&self, _transaction: Transaction) -> Result<(), BackendError> {
        Err(BackendError::ConnectionError("connection refused".to_string()))
    }

    async fn clean(&self) -> Result<(), BackendError> {
        Err(BackendError::ConnectionError("connection refused".to_string()))
    }

    async fn get(&self, _bucket: &str, _key: &str) -> Result<ValueSet, BackendError> {
        Err(BackendError::ConnectionError("connection refused".to_string()))
    }

    async fn union(&self, _bucket: &str, _keys: &[String]) -> Result<ValueSet, BackendError> {
        Err(BackendError::ConnectionError("connection refused".to_string()))
    }
}

/// Memory backend whose `end` fails on the given call (1-based).
struct FailingCommitBackend {
    inner: MemoryBackend,
    commits: AtomicUsize,
    fail_on: usize,
}

impl FailingCommitBackend {
    fn new(fail_on: usize) -> Self {
        Self {
            inner: MemoryBackend::new(),
            commits: AtomicUsize::new(0),
            fail_on,
        }
    }
}

#[async_trait]
impl Backend for FailingCommitBackend {
    async fn end(&self, transaction: Transaction) -> Result<(), BackendError> {
        if self.commits.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(BackendError::CommandError("EXECABORT".to_string()));
        }
        self.inner.end(transaction).await
    }

    async fn clean(&self) -> Result<(), BackendError> {
        self.inner.clean().await
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ValueSet, BackendError> {
        self.inner.get(bucket, key).await
    }

    async fn union(&self, bucket: &str, keys: &[String]) -> Result<ValueSet, BackendError> {
        self.inner.union(bucket, keys).await
    }
}

fn set(values: &[&str]) -> ValueSet {
    values.iter().map(|v| v.to_string()).collect()
}

fn memory_acl() -> (Acl, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    (Acl::new(backend.clone()), backend)
}

fn plain_acl() -> Acl {
    Acl::new(Arc::new(PlainBackend(MemoryBackend::new())))
}

// ============================================================================
// Grants
// ============================================================================

#[tokio::test]
async fn test_blog_admin_scenario() {
    let (acl, _) = memory_acl();

    acl.allow(&["admin"], &["blogs"], &["get", "put", "delete"]).await.unwrap();
    acl.add_user_roles("u1", &["admin"]).await.unwrap();

    assert!(acl.is_allowed("u1", "blogs", &["get"]).await.unwrap());
    assert!(!acl.is_allowed("u1", "blogs", &["post"]).await.unwrap());
    assert!(acl.is_allowed("u1", "blogs", &["get", "put", "delete"]).await.unwrap());
    assert!(!acl.is_allowed("u1", "blogs", &["get", "post"]).await.unwrap());
}

#[tokio::test]
async fn test_grant_then_revoke_round_trip() {
    let (acl, _) = memory_acl();

    acl.allow(&["editor"], &["news"], &["put"]).await.unwrap();
    acl.remove_allow("editor", &["news"], &["put"]).await.unwrap();

    assert!(acl.resource_permissions(&["editor"], "news").await.unwrap().is_empty());
    assert!(acl.what_resources(&["editor"]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_grant_twice_is_idempotent() {
    let (acl, _) = memory_acl();

    acl.allow(&["editor"], &["news"], &["put"]).await.unwrap();
    acl.allow(&["editor"], &["news"], &["put"]).await.unwrap();

    let perms = acl.resource_permissions(&["editor"], "news").await.unwrap();
    assert_eq!(perms, set(&["put"]));
}

#[tokio::test]
async fn test_revoking_only_grant_drops_resource() {
    let (acl, backend) = memory_acl();

    acl.allow(&["editor"], &["news", "blogs"], &["put"]).await.unwrap();
    acl.remove_allow("editor", &["news"], &["put"]).await.unwrap();

    assert_eq!(backend.get("resources", "editor").await.unwrap(), set(&["blogs"]));
    assert_eq!(acl.roles_resources(&["editor"]).await.unwrap(), set(&["blogs"]));
}

// ============================================================================
// Inheritance
// ============================================================================

#[tokio::test]
async fn test_permission_inherited_from_parent() {
    let (acl, _) = memory_acl();

    acl.add_role_parents("a", &["b"]).await.unwrap();
    acl.allow(&["b"], &["doc"], &["read"]).await.unwrap();
    acl.add_user_roles("u1", &["a"]).await.unwrap();

    assert!(acl.is_allowed("u1", "doc", &["read"]).await.unwrap());
    assert!(!acl.is_allowed("u1", "doc", &["write"]).await.unwrap());
}

#[tokio::test]
async fn test_revoking_parent_grant_removes_inheritance() {
    let (acl, _) = memory_acl();

    acl.add_role_parents("admin", &["user"]).await.unwrap();
    acl.allow(&["user"], &["blogs"], &["get"]).await.unwrap();
    assert!(acl.are_any_roles_allowed(&["admin"], "blogs", &["get"]).await.unwrap());

    acl.remove_allow_all("user", &["blogs"]).await.unwrap();
    assert!(!acl.are_any_roles_allowed(&["admin"], "blogs", &["get"]).await.unwrap());
}

#[tokio::test]
async fn test_removing_parent_edge_removes_inheritance() {
    let (acl, _) = memory_acl();

    acl.add_role_parents("admin", &["user"]).await.unwrap();
    acl.allow(&["user"], &["blogs"], &["get"]).await.unwrap();
    acl.remove_role_parents("admin", &["user"]).await.unwrap();

    assert!(!acl.are_any_roles_allowed(&["admin"], "blogs", &["get"]).await.unwrap());
}

#[tokio::test]
async fn test_cyclic_hierarchy_terminates() {
    let (acl, _) = memory_acl();

    acl.add_role_parents("a", &["b"]).await.unwrap();
    acl.add_role_parents("b", &["a"]).await.unwrap();
    acl.allow(&["b"], &["doc"], &["read"]).await.unwrap();
    acl.add_user_roles("u1", &["a"]).await.unwrap();

    assert!(acl.is_allowed("u1", "doc", &["read"]).await.unwrap());
    assert!(!acl.is_allowed("u1", "doc", &["write"]).await.unwrap());
    assert_eq!(acl.all_user_roles("u1").await.unwrap(), set(&["a", "b"]));

    let perms = acl.allowed_permissions("u1", &["doc"]).await.unwrap();
    assert_eq!(perms["doc"], set(&["read"]));
}

// ============================================================================
// Wildcard
// ============================================================================

#[tokio::test]
async fn test_wildcard_allows_unlisted_permissions() {
    let (acl, _) = memory_acl();

    acl.allow(&["root"], &["blogs"], &["*"]).await.unwrap();
    acl.add_user_roles("u1", &["root"]).await.unwrap();

    assert!(acl.is_allowed("u1", "blogs", &["get"]).await.unwrap());
    assert!(acl.is_allowed("u1", "blogs", &["never-listed", "put"]).await.unwrap());
    assert!(!acl.is_allowed("u1", "news", &["get"]).await.unwrap());
}

// ============================================================================
// Users without roles
// ============================================================================

#[tokio::test]
async fn test_user_without_roles_is_denied_without_lookup() {
    let (acl, backend) = memory_acl();
    acl.allow(&["admin"], &["blogs"], &["get"]).await.unwrap();

    let before = backend.stats();
    assert!(!acl.is_allowed("nobody", "blogs", &["get"]).await.unwrap());
    let after = backend.stats();

    assert_eq!(after.gets, before.gets + 1);
    assert_eq!(after.unions, before.unions);
}

// ============================================================================
// Deletion
// ============================================================================

#[tokio::test]
async fn test_deleted_role_stays_on_user() {
    let (acl, backend) = memory_acl();

    acl.allow(&["admin"], &["blogs"], &["get"]).await.unwrap();
    acl.add_user_roles("u1", &["admin"]).await.unwrap();
    acl.remove_role("admin").await.unwrap();

    assert!(!backend.get("meta", "roles").await.unwrap().contains("admin"));
    assert!(backend.get("allows_blogs", "admin").await.unwrap().is_empty());
    assert!(acl.role_users("admin").await.unwrap().is_empty());

    assert!(acl.user_roles("u1").await.unwrap().contains("admin"));
    assert!(!acl.is_allowed("u1", "blogs", &["get"]).await.unwrap());
}

#[tokio::test]
async fn test_deleted_resource_denies_everyone() {
    let (acl, _) = memory_acl();

    acl.allow(&["admin", "editor"], &["blogs", "news"], &["get"]).await.unwrap();
    acl.add_user_roles("u1", &["editor"]).await.unwrap();
    acl.remove_resource("blogs").await.unwrap();

    assert!(!acl.is_allowed("u1", "blogs", &["get"]).await.unwrap());
    assert!(acl.is_allowed("u1", "news", &["get"]).await.unwrap());
    assert_eq!(acl.roles_resources(&["admin"]).await.unwrap(), set(&["news"]));
}

// ============================================================================
// Allowed permissions
// ============================================================================

async fn seed(acl: &Acl) {
    acl.allow(&["guest"], &["blogs"], &["get"]).await.unwrap();
    acl.allow(&["member"], &["blogs", "forums"], &["post"]).await.unwrap();
    acl.allow(&["admin"], &["blogs"], &["delete"]).await.unwrap();
    acl.add_role_parents("member", &["guest"]).await.unwrap();
    acl.add_role_parents("admin", &["member"]).await.unwrap();
    acl.add_user_roles("u1", &["admin"]).await.unwrap();
}

#[tokio::test]
async fn test_allowed_permissions_strategies_agree() {
    let (optimized, _) = memory_acl();
    let plain = plain_acl();
    seed(&optimized).await;
    seed(&plain).await;

    assert!(optimized.backend().supports_unions());
    assert!(!plain.backend().supports_unions());

    let resources = ["blogs", "forums", "wiki"];
    let fast = optimized.allowed_permissions("u1", &resources).await.unwrap();
    let slow = plain.allowed_permissions("u1", &resources).await.unwrap();

    assert_eq!(fast, slow);
    assert_eq!(fast["blogs"], set(&["delete", "get", "post"]));
    assert_eq!(fast["forums"], set(&["post"]));
    assert!(fast["wiki"].is_empty());
}

#[tokio::test]
async fn test_allowed_permissions_user_without_roles() {
    let plain = plain_acl();
    seed(&plain).await;

    let result = plain.allowed_permissions("ghost", &["blogs"]).await.unwrap();
    assert_eq!(result, BTreeMap::from([("blogs".to_string(), ValueSet::new())]));
}

// ============================================================================
// Failing backends
// ============================================================================

#[tokio::test]
async fn test_backend_errors_propagate() {
    let acl = Acl::new(Arc::new(BrokenBackend));

    let err = acl.is_allowed("u1", "blogs", &["get"]).await.unwrap_err();
    assert!(matches!(err, AclError::Backend(BackendError::ConnectionError(_))));

    let err = acl.allow(&["admin"], &["blogs"], &["get"]).await.unwrap_err();
    assert!(err.is_backend_error());

    let err = acl.remove_role("admin").await.unwrap_err();
    assert!(err.is_backend_error());
}

// ============================================================================
// Compact policies
// ============================================================================

#[tokio::test]
async fn test_allow_many_stops_at_first_failure() {
    let acl = Acl::new(Arc::new(FailingCommitBackend::new(2)));

    let rules = AllowRule::list_from_json(
        r#"[
            {
                "roles": "editor",
                "allows": [
                    { "resources": "x", "permissions": "get" },
                    { "resources": "y", "permissions": "get" },
                    { "resources": "z", "permissions": "get" }
                ]
            }
        ]"#,
    )
    .unwrap();

    let err = acl.allow_many(&rules).await.unwrap_err();
    assert!(err.is_backend_error());

    assert!(acl.are_any_roles_allowed(&["editor"], "x", &["get"]).await.unwrap());
    assert!(!acl.are_any_roles_allowed(&["editor"], "y", &["get"]).await.unwrap());
    assert!(!acl.are_any_roles_allowed(&["editor"], "z", &["get"]).await.unwrap());
}
