//! # ACL Guard
//!
//! Enforces [`acl_engine`] decisions on incoming requests.
//!
//! ## Overview
//!
//! For each request the guard:
//! - **Resolves the principal** from the request, a fixed id, or a custom resolver
//! - **Derives the resource** from the URL path (optionally its first `n` segments)
//! - **Derives the actions** from the HTTP method, or uses a configured list
//! - **Checks the ACL** and maps the outcome to 401, 403 or 500
//!
//! The guard does not depend on a web framework. An adapter builds an
//! [`AccessRequest`] and turns a [`GuardError`] into a response with
//! [`GuardError::status_code`] and [`GuardError::to_json`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acl_guard::{AccessRequest, Guard};
//!
//! async fn handle(guard: &Guard, request: AccessRequest) -> (u16, String) {
//!     match guard.authorize(&request).await {
//!         Ok(grant) => (200, format!("hello {}", grant.principal)),
//!         Err(e) => (e.status_code(), e.to_json().to_string()),
//!     }
//! }
//! ```

pub mod error;
pub mod guard;

pub use error::{ErrorBody, GuardError, GuardResult};
pub use guard::{
    AccessGrant, AccessRequest, Guard, GuardConfig, PrincipalResolver, PrincipalSource,
};
