//! # Permissions
//!
//! Permissions are plain action names (`"get"`, `"put"`, `"approve"`) stored
//! as sets per role and resource. The wildcard `"*"` grants every action.

use acl_backend::ValueSet;

/// Permission that grants every action on a resource.
pub const WILDCARD: &str = "*";

/// Check if a granted set includes the wildcard.
pub fn grants_all(granted: &ValueSet) -> bool {
    granted.contains(WILDCARD)
}

/// Required permissions not covered by `granted`.
///
/// Order of `required` is preserved. The wildcard is not expanded here;
/// callers check [`grants_all`] first.
pub fn unmet(required: &[String], granted: &ValueSet) -> Vec<String> {
    required
        .iter()
        .filter(|perm| !granted.contains(perm.as_str()))
        .cloned()
        .collect()
}

/// Check if `granted` contains at least one of `requested`.
pub fn shares_any(requested: &[String], granted: &ValueSet) -> bool {
    requested.iter().any(|perm| granted.contains(perm.as_str()))
}
