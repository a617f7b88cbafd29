//! Compact grants
//!
//! A policy can be written as a list of rules, each granting several
//! resource/permission groups to a set of roles:
//!
//! ```json
//! [
//!   {
//!     "roles": ["guest", "member"],
//!     "allows": [
//!       { "resources": "blogs", "permissions": "get" },
//!       { "resources": ["forums", "news"], "permissions": ["get", "put", "delete"] }
//!     ]
//!   },
//!   {
//!     "roles": "gold",
//!     "allows": [{ "resources": ["cash", "money"], "permissions": ["sell", "exchange"] }]
//!   }
//! ]
//! ```
//!
//! Every field accepts a single string or a list.

use crate::acl::Acl;
use crate::error::{AclError, AclResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Roles and the grants given to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowRule {
    /// Roles receiving the grants.
    #[serde(deserialize_with = "one_or_many")]
    pub roles: Vec<String>,
    /// Resource/permission groups.
    pub allows: Vec<AllowEntry>,
}

/// Permissions granted on a group of resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowEntry {
    /// Resources the permissions apply to.
    #[serde(deserialize_with = "one_or_many")]
    pub resources: Vec<String>,
    /// Granted permissions.
    #[serde(deserialize_with = "one_or_many")]
    pub permissions: Vec<String>,
}

/// One primitive grant produced by [`demux`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Roles receiving the grant.
    pub roles: Vec<String>,
    /// Resources the permissions apply to.
    pub resources: Vec<String>,
    /// Granted permissions.
    pub permissions: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

impl AllowRule {
    /// Parse a policy document (a JSON list of rules).
    pub fn list_from_json(json: &str) -> AclResult<Vec<AllowRule>> {
        serde_json::from_str(json).map_err(|e| AclError::InvalidPolicy(e.to_string()))
    }
}

/// Flatten rules into primitive grants, in document order.
pub fn demux(rules: &[AllowRule]) -> Vec<Grant> {
    rules
        .iter()
        .flat_map(|rule| {
            rule.allows.iter().map(move |entry| Grant {
                roles: rule.roles.clone(),
                resources: entry.resources.clone(),
                permissions: entry.permissions.clone(),
            })
        })
        .collect()
}

impl Acl {
    /// Apply a compact policy.
    ///
    /// Grants are applied one after another, each as its own transaction.
    /// The first failure stops the run; earlier grants stay applied.
    pub async fn allow_many(&self, rules: &[AllowRule]) -> AclResult<()> {
        let grants = demux(rules);

        for grant in &grants {
            self.allow(&grant.roles, &grant.resources, &grant.permissions)
                .await?;
        }

        tracing::debug!(rules = rules.len(), grants = grants.len(), "Applied compact grants");
        Ok(())
    }
}
