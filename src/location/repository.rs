//! Location repository
//!
//! Fetches one location fix after making sure location permissions are held.
//! Approximate location is enough: the fetch proceeds when only one of the
//! two location permissions was denied.

use std::sync::Arc;

use crate::core::{permission_set, PermissionError};
use crate::permissions::PermissionChecker;

use super::error::LocationError;
use super::model::Location;
use super::source::LocationSource;

/// Precise location permission identifier
pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";

/// Approximate location permission identifier
pub const ACCESS_COARSE_LOCATION: &str = "android.permission.ACCESS_COARSE_LOCATION";

/// Fetches the device location through a permission checker
pub struct LocationRepository {
    checker: Arc<dyn PermissionChecker>,
    source: Arc<dyn LocationSource>,
}

impl LocationRepository {
    /// Create a repository
    pub fn new(checker: Arc<dyn PermissionChecker>, source: Arc<dyn LocationSource>) -> Self {
        Self { checker, source }
    }

    /// Get the current location
    pub async fn get_location(&self) -> Result<Location, LocationError> {
        let checked = self
            .checker
            .check_permissions(permission_set([ACCESS_FINE_LOCATION, ACCESS_COARSE_LOCATION]))
            .await;

        match checked {
            Ok(()) => {}
            Err(PermissionError::Denied { denied }) if denied.len() == 1 => {
                tracing::info!("Continuing with partial location access, denied: {:?}", denied);
            }
            Err(e) => return Err(e.into()),
        }

        if !self.source.is_enabled() {
            return Err(LocationError::LocationIsOff);
        }

        let location = self.source.current_fix().await?;
        tracing::debug!("Location fix: {}", location);
        Ok(location)
    }
}
