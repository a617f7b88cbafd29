//! Bucket schema
//!
//! Names of the logical buckets the engine stores its relations in, and the
//! naming function for per-resource permission buckets.

use serde::{Deserialize, Serialize};

/// Key in the meta bucket listing every user.
pub const META_USERS: &str = "users";

/// Key in the meta bucket listing every role.
pub const META_ROLES: &str = "roles";

/// Default prefix of per-resource permission buckets.
pub const DEFAULT_ALLOWS_PREFIX: &str = "allows_";

/// Backend bucket names.
///
/// # Example
///
/// ```
/// use acl_engine::BucketNames;
///
/// let buckets = BucketNames::default();
/// assert_eq!(buckets.allows_bucket("blogs"), "allows_blogs");
/// assert_eq!(buckets.key_from_allows_bucket("allows_blogs"), "blogs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketNames {
    /// Registry of known users and roles.
    pub meta: String,
    /// role -> parent roles
    pub parents: String,
    /// role -> resources the role has permissions on
    pub resources: String,
    /// role -> users holding it
    pub roles: String,
    /// user -> roles
    pub users: String,
    /// Prefix of the per-resource permission buckets.
    pub allows_prefix: String,
}

impl Default for BucketNames {
    fn default() -> Self {
        Self {
            meta: "meta".to_string(),
            parents: "parents".to_string(),
            resources: "resources".to_string(),
            roles: "roles".to_string(),
            users: "users".to_string(),
            allows_prefix: DEFAULT_ALLOWS_PREFIX.to_string(),
        }
    }
}

impl BucketNames {
    /// Permission bucket for `resource`.
    pub fn allows_bucket(&self, resource: &str) -> String {
        format!("{}{}", self.allows_prefix, resource)
    }

    /// Resource name of a permission bucket.
    ///
    /// Returns the input unchanged if it does not carry the prefix.
    pub fn key_from_allows_bucket<'a>(&self, bucket: &'a str) -> &'a str {
        bucket.strip_prefix(self.allows_prefix.as_str()).unwrap_or(bucket)
    }
}

/// Normalize a slice of names into owned strings.
pub(crate) fn names<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|item| item.as_ref().to_string()).collect()
}
