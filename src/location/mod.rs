//! Location fetching
//!
//! The one consumer of the permission coordinator: it asks for fine and
//! coarse location access, then waits for a single fix from a
//! `LocationSource`.

mod error;
mod model;
mod repository;
mod source;

pub use error::LocationError;
pub use model::{Location, LocationState};
pub use repository::{LocationRepository, ACCESS_COARSE_LOCATION, ACCESS_FINE_LOCATION};
pub use source::{FixedLocationSource, LocationSource};
