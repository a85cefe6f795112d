//! Location value types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single position fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// When the fix was taken
    pub fixed_at: DateTime<Utc>,
}

impl Location {
    /// Create a fix taken now
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            fixed_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// What the consumer currently knows about the location
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum LocationState {
    /// Nothing fetched yet
    #[default]
    Empty,
    /// A fix was fetched
    Loaded(Location),
}

impl LocationState {
    /// The loaded location, if any
    pub fn location(&self) -> Option<&Location> {
        match self {
            LocationState::Empty => None,
            LocationState::Loaded(location) => Some(location),
        }
    }
}
