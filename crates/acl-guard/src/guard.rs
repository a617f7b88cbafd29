//! Request guard
//!
//! Derives a `(principal, resource, actions)` triple from a request and asks
//! the ACL whether it is allowed. The guard is framework-neutral: adapters
//! build an [`AccessRequest`] from their own request type and map the
//! returned [`GuardError`] to a response.

use crate::error::{GuardError, GuardResult};
use acl_engine::Acl;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Resolves the principal of a request.
pub type PrincipalResolver = Arc<dyn Fn(&AccessRequest) -> Option<String> + Send + Sync>;

/// Where the guard takes the principal id from.
#[derive(Clone, Default)]
pub enum PrincipalSource {
    /// The `principal` field of the request (set by the authentication layer)
    #[default]
    Request,
    /// Always the same principal
    Fixed(String),
    /// A custom resolver
    Resolver(PrincipalResolver),
}

impl std::fmt::Debug for PrincipalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalSource::Request => f.write_str("Request"),
            PrincipalSource::Fixed(id) => f.debug_tuple("Fixed").field(id).finish(),
            PrincipalSource::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// Guard configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Number of leading path segments that name the resource.
    ///
    /// `None` (or `Some(0)`) uses the whole path.
    pub num_path_components: Option<usize>,

    /// Actions to check instead of the request method.
    pub actions: Option<Vec<String>>,

    /// Log every request and decision at debug level.
    pub log_decisions: bool,
}

impl GuardConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACL_GUARD_PATH_COMPONENTS`: leading path segments naming the resource
    /// - `ACL_GUARD_ACTIONS`: comma-separated actions to check
    /// - `ACL_GUARD_LOG_DECISIONS`: log decisions (default: false)
    pub fn from_env() -> Self {
        Self {
            num_path_components: std::env::var("ACL_GUARD_PATH_COMPONENTS")
                .ok()
                .and_then(|s| s.parse().ok()),
            actions: std::env::var("ACL_GUARD_ACTIONS").ok().map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
            log_decisions: std::env::var("ACL_GUARD_LOG_DECISIONS")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
        }
    }
}

/// What the guard needs to know about a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// HTTP method (e.g., "GET").
    pub method: String,
    /// Request URL path, optionally with a query string.
    pub url: String,
    /// Authenticated principal, if any.
    pub principal: Option<String>,
}

impl AccessRequest {
    /// Create an unauthenticated request.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            principal: None,
        }
    }

    /// Attach the authenticated principal.
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }
}

/// A request the guard let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessGrant {
    /// Principal that was checked
    pub principal: String,
    /// Resource derived from the URL
    pub resource: String,
    /// Actions that were checked
    pub actions: Vec<String>,
}

/// Enforces ACL decisions on requests.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use acl_engine::{Acl, MemoryBackend};
/// use acl_guard::{AccessRequest, Guard, GuardConfig};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let acl = Acl::new(Arc::new(MemoryBackend::new()));
///     acl.allow(&["member"], &["/blogs"], &["get"]).await?;
///     acl.add_user_roles("u1", &["member"]).await?;
///
///     let guard = Guard::new(acl, GuardConfig { num_path_components: Some(1), ..Default::default() });
///
///     let request = AccessRequest::new("GET", "/blogs/42?page=2").with_principal("u1");
///     let grant = guard.authorize(&request).await?;
///     assert_eq!(grant.resource, "/blogs");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Guard {
    acl: Acl,
    config: GuardConfig,
    principal: PrincipalSource,
}

impl Guard {
    /// Create a guard reading the principal from the request.
    pub fn new(acl: Acl, config: GuardConfig) -> Self {
        Self {
            acl,
            config,
            principal: PrincipalSource::Request,
        }
    }

    /// Use a different principal source.
    pub fn with_principal_source(mut self, source: PrincipalSource) -> Self {
        self.principal = source;
        self
    }

    /// Guard configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Resource name for a URL.
    ///
    /// The query string is dropped; with `num_path_components = n` only the
    /// first `n` path segments are kept (`/blogs/42/comments` → `/blogs`
    /// for `n = 1`).
    pub fn resource_for(&self, url: &str) -> String {
        let path = url.split('?').next().unwrap_or(url);

        match self.config.num_path_components {
            Some(n) if n > 0 => path.split('/').take(n + 1).collect::<Vec<_>>().join("/"),
            _ => path.to_string(),
        }
    }

    /// Actions to check for a request method.
    pub fn actions_for(&self, method: &str) -> Vec<String> {
        match &self.config.actions {
            Some(actions) => actions.clone(),
            None => vec![method.to_lowercase()],
        }
    }

    fn principal_for(&self, request: &AccessRequest) -> Option<String> {
        let principal = match &self.principal {
            PrincipalSource::Request => request.principal.clone(),
            PrincipalSource::Fixed(id) => Some(id.clone()),
            PrincipalSource::Resolver(resolve) => resolve(request),
        };
        principal.filter(|id| !id.is_empty())
    }

    /// Check a request against the ACL.
    ///
    /// # Errors
    ///
    /// - [`GuardError::Unauthenticated`] if no principal is resolved
    /// - [`GuardError::Forbidden`] if any action is not allowed
    /// - [`GuardError::Internal`] if the ACL backend fails
    pub async fn authorize(&self, request: &AccessRequest) -> GuardResult<AccessGrant> {
        let Some(principal) = self.principal_for(request) else {
            if self.config.log_decisions {
                tracing::debug!(url = %request.url, "Rejected unauthenticated request");
            }
            return Err(GuardError::Unauthenticated);
        };

        let resource = self.resource_for(&request.url);
        let actions = self.actions_for(&request.method);

        if self.config.log_decisions {
            tracing::debug!(
                principal = %principal,
                resource = %resource,
                actions = ?actions,
                "Requesting access"
            );
        }

        let allowed = match self.acl.is_allowed(&principal, &resource, &actions).await {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    principal = %principal,
                    resource = %resource,
                    "Failed to check permissions"
                );
                return Err(GuardError::Internal(e));
            }
        };

        if !allowed {
            if self.config.log_decisions {
                tracing::debug!(
                    principal = %principal,
                    resource = %resource,
                    actions = ?actions,
                    "Access denied"
                );
                self.log_allowed_permissions(&principal, &resource).await;
            }
            return Err(GuardError::Forbidden);
        }

        if self.config.log_decisions {
            tracing::debug!(
                principal = %principal,
                resource = %resource,
                actions = ?actions,
                "Access granted"
            );
        }

        Ok(AccessGrant {
            principal,
            resource,
            actions,
        })
    }

    async fn log_allowed_permissions(&self, principal: &str, resource: &str) {
        match self.acl.allowed_permissions(principal, &[resource]).await {
            Ok(allowed) => {
                tracing::debug!(principal = %principal, allowed = ?allowed, "Allowed permissions");
            }
            Err(e) => {
                tracing::warn!(error = %e, principal = %principal, "Failed to list allowed permissions");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acl_engine::MemoryBackend;

    fn guard_with(config: GuardConfig) -> Guard {
        Guard::new(Acl::new(Arc::new(MemoryBackend::new())), config)
    }

    fn guard_with_components(n: usize) -> Guard {
        guard_with(GuardConfig {
            num_path_components: Some(n),
            ..Default::default()
        })
    }

    #[test]
    fn test_resource_for_full_path() {
        let guard = guard_with(GuardConfig::default());
        assert_eq!(guard.resource_for("/blogs/42?draft=true"), "/blogs/42");
        assert_eq!(guard.resource_for("/blogs"), "/blogs");
    }

    #[test]
    fn test_resource_for_path_components() {
        let guard = guard_with_components(2);
        assert_eq!(guard.resource_for("/api/blogs/42/comments"), "/api/blogs");
        assert_eq!(guard.resource_for("/api"), "/api");

        let guard = guard_with_components(0);
        assert_eq!(guard.resource_for("/api/blogs"), "/api/blogs");
    }

    #[test]
    fn test_actions_for() {
        let guard = guard_with(GuardConfig::default());
        assert_eq!(guard.actions_for("DELETE"), vec!["delete".to_string()]);

        let guard = guard_with(GuardConfig {
            actions: Some(vec!["view".to_string(), "comment".to_string()]),
            ..Default::default()
        });
        assert_eq!(
            guard.actions_for("GET"),
            vec!["view".to_string(), "comment".to_string()]
        );
    }

    #[test]
    fn test_principal_sources() {
        let request = AccessRequest::new("GET", "/blogs").with_principal("u1");

        let guard = guard_with(GuardConfig::default());
        assert_eq!(guard.principal_for(&request), Some("u1".to_string()));
        assert_eq!(guard.principal_for(&AccessRequest::new("GET", "/blogs")), None);

        let guard = guard.with_principal_source(PrincipalSource::Fixed("service".to_string()));
        assert_eq!(guard.principal_for(&request), Some("service".to_string()));

        let guard = guard.with_principal_source(PrincipalSource::Resolver(Arc::new(|req| {
            req.principal.as_ref().map(|p| format!("tenant-a:{}", p))
        })));
        assert_eq!(guard.principal_for(&request), Some("tenant-a:u1".to_string()));
    }

    #[test]
    fn test_empty_principal_is_missing() {
        let guard = guard_with(GuardConfig::default());
        let request = AccessRequest::new("GET", "/blogs").with_principal("");
        assert_eq!(guard.principal_for(&request), None);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: GuardConfig = serde_json::from_str(r#"{"num_path_components": 1}"#).unwrap();
        assert_eq!(config.num_path_components, Some(1));
        assert!(config.actions.is_none());
        assert!(!config.log_decisions);
    }
}
