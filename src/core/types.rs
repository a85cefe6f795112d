//! Shared value types

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A set of permission identifiers
pub type PermissionSet = BTreeSet<String>;

/// Granted/denied answer per permission identifier, as reported by a host
pub type GrantMap = BTreeMap<String, bool>;

/// Build a [`PermissionSet`] from string-like identifiers
pub fn permission_set<I, S>(permissions: I) -> PermissionSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    permissions.into_iter().map(Into::into).collect()
}

/// Identifier of one armed permission request
///
/// Hosts echo it back with the result so that late answers to an
/// abandoned prompt can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh request id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
