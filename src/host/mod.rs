//! Permission hosts
//!
//! A host is the UI surface that presents the system permission prompt:
//! - `PermissionHost` - Trait implemented by hosts
//! - `HostRegistry` - Weakly tracks registered hosts and hands out a usable one
//! - `SimulatedHost` - Scripted host for demos and tests

mod host;
mod registry;
pub mod simulated;

pub use host::{PermissionHost, PromptRequest};
pub use registry::HostRegistry;
pub use simulated::SimulatedHost;
