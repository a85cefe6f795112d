//! Permission checker trait

use async_trait::async_trait;

use crate::core::{CoordinatorResult, GrantMap, PermissionError, PermissionSet};

/// Anything that can make sure a set of permissions is granted
///
/// Returns `Ok(())` when every permission is granted, otherwise an error
/// telling denial (`PermissionError::Denied`) apart from failures to ask.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// Check (and if needed request) `permissions`
    async fn check_permissions(&self, permissions: PermissionSet) -> CoordinatorResult<()>;
}

/// Classify a host answer against the requested set
///
/// Every requested permission must map to `true`. Permissions missing from
/// `grants` count as denied; extra entries are ignored.
pub fn classify(requested: &PermissionSet, grants: &GrantMap) -> CoordinatorResult<()> {
    let denied: PermissionSet = requested
        .iter()
        .filter(|p| grants.get(p.as_str()) != Some(&true))
        .cloned()
        .collect();

    if denied.is_empty() {
        Ok(())
    } else {
        Err(PermissionError::Denied { denied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::permission_set;

    fn grants(pairs: &[(&str, bool)]) -> GrantMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_all_granted() {
        let requested = permission_set(["fine", "coarse"]);
        let result = classify(&requested, &grants(&[("fine", true), ("coarse", true)]));
        assert!(result.is_ok());
    }

    #[test]
    fn test_partial_grant_is_denial() {
        let requested = permission_set(["fine", "coarse"]);
        let err = classify(&requested, &grants(&[("fine", true), ("coarse", false)])).unwrap_err();
        assert_eq!(err.denied_permissions(), Some(&permission_set(["coarse"])));
    }

    #[test]
    fn test_missing_entry_is_denied() {
        let requested = permission_set(["fine", "coarse"]);
        let err = classify(&requested, &grants(&[("fine", true)])).unwrap_err();
        assert_eq!(err.denied_permissions(), Some(&permission_set(["coarse"])));
    }

    #[test]
    fn test_extra_entries_ignored() {
        let requested = permission_set(["fine"]);
        let result = classify(&requested, &grants(&[("fine", true), ("camera", false)]));
        assert!(result.is_ok());
    }
}
