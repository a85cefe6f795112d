//! Location source trait

use async_trait::async_trait;

use super::error::LocationError;
use super::model::Location;

/// Platform location provider
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Whether any provider (GPS, network) is switched on
    fn is_enabled(&self) -> bool;

    /// Wait for the next position fix
    async fn current_fix(&self) -> Result<Location, LocationError>;
}

/// Source that always reports the same coordinates
#[derive(Debug, Clone)]
pub struct FixedLocationSource {
    latitude: f64,
    longitude: f64,
    enabled: bool,
}

impl FixedLocationSource {
    /// Create an enabled source reporting `latitude`, `longitude`
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            enabled: true,
        }
    }

    /// Create a source with every provider switched off
    pub fn disabled() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            enabled: false,
        }
    }
}

#[async_trait]
impl LocationSource for FixedLocationSource {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn current_fix(&self) -> Result<Location, LocationError> {
        if !self.enabled {
            return Err(LocationError::LocationIsOff);
        }
        Ok(Location::new(self.latitude, self.longitude))
    }
}
