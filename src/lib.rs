pub mod config;
pub mod core;
pub mod host;
pub mod permissions;

// Optional components
pub mod logging;

// The location feature built on top of the coordinator
pub mod location;

pub use config::CoordinatorConfig;
pub use core::{permission_set, CoordinatorResult, PermissionError, PermissionSet};
pub use host::{HostRegistry, PermissionHost};
pub use permissions::{PermissionChecker, PermissionCoordinator};
