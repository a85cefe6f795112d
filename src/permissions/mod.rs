//! Runtime permission requests
//!
//! This module turns the prompt-and-callback flow of a UI host into a single
//! awaitable call:
//! - **`PermissionCoordinator`**: serializes requests, waits for a usable host,
//!   presents the prompt and resolves the caller with the classified result
//! - **`PermissionChecker`**: the trait consumers depend on
//! - **`GrantStatus`**: the platform's "already granted?" capability
//!
//! ## Example
//!
//! ```rust,ignore
//! use permission_broker::core::permission_set;
//! use permission_broker::host::HostRegistry;
//! use permission_broker::permissions::{GrantLedger, PermissionCoordinator};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(HostRegistry::new());
//! let coordinator = PermissionCoordinator::new(registry.clone(), Default::default())?
//!     .with_grant_status(Arc::new(GrantLedger::new()));
//!
//! match coordinator.check_permissions(permission_set(["android.permission.CAMERA"])).await {
//!     Ok(()) => { /* use the camera */ }
//!     Err(e) if e.is_denied() => { /* explain and maybe ask again */ }
//!     Err(e) => { /* no screen to ask from, cancelled, ... */ }
//! }
//! ```

mod checker;
mod coordinator;
mod grants;
mod pending;

pub use checker::{classify, PermissionChecker};
pub use coordinator::{Delivery, EventReceiver, PermissionCoordinator};
pub use grants::{GrantLedger, GrantStatus};
pub use pending::{PendingRequest, PendingSlot, ResultReceiver, ResultSender};

