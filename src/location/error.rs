//! Location error types

use thiserror::Error;

use crate::core::PermissionError;

/// Errors that can occur while fetching a location
#[derive(Error, Debug)]
pub enum LocationError {
    /// Location permissions could not be obtained
    #[error(transparent)]
    Permission(#[from] PermissionError),

    /// Every location provider is switched off
    #[error("Location is turned off")]
    LocationIsOff,
}
