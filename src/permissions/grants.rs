//! Platform grant status
//!
//! The platform knows which permissions the app already holds. The
//! coordinator consults it to skip prompting when nothing is missing.

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use crate::core::{GrantMap, PermissionSet};

/// Synchronous "is this permission already granted?" capability
pub trait GrantStatus: Send + Sync {
    /// Check a single permission identifier
    fn is_granted(&self, permission: &str) -> bool;

    /// Check that every identifier is granted
    fn all_granted(&self, permissions: &PermissionSet) -> bool {
        permissions.iter().all(|p| self.is_granted(p))
    }
}

/// In-memory grant status
///
/// Shared via `Arc<GrantLedger>`; grants recorded here are immediately
/// visible to every coordinator holding it.
#[derive(Debug, Default)]
pub struct GrantLedger {
    granted: RwLock<BTreeSet<String>>,
}

impl GrantLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger with initial grants
    pub fn with_granted<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: RwLock::new(permissions.into_iter().map(Into::into).collect()),
        }
    }

    /// Mark a permission as granted
    pub fn grant(&self, permission: impl Into<String>) {
        let permission = permission.into();
        let mut granted = self.granted.write().unwrap_or_else(PoisonError::into_inner);
        if granted.insert(permission.clone()) {
            tracing::info!("Permission granted: {}", permission);
        }
    }

    /// Mark a permission as not granted
    pub fn revoke(&self, permission: &str) {
        let mut granted = self.granted.write().unwrap_or_else(PoisonError::into_inner);
        if granted.remove(permission) {
            tracing::info!("Permission revoked: {}", permission);
        }
    }

    /// Apply a prompt result
    pub fn record(&self, grants: &GrantMap) {
        for (permission, &allowed) in grants {
            if allowed {
                self.grant(permission.as_str());
            } else {
                self.revoke(permission);
            }
        }
    }

    /// All granted permissions
    pub fn granted(&self) -> BTreeSet<String> {
        self.granted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl GrantStatus for GrantLedger {
    fn is_granted(&self, permission: &str) -> bool {
        self.granted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(permission)
    }
}
