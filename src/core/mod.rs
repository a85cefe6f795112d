//! Core types for the permission broker
//!
//! This module provides the fundamental types used throughout the crate:
//! - `PermissionSet` / `GrantMap` / `RequestId` - Request and answer types
//! - `RequestState` - State of the request inside a coordinator
//! - `CoordinatorEvent` - Events streamed to subscribers
//! - `PermissionError` - Error types

pub mod error;
pub mod event;
pub mod state;
pub mod types;

pub use error::{CoordinatorResult, PermissionError};
pub use event::CoordinatorEvent;
pub use state::RequestState;
pub use types::{permission_set, GrantMap, PermissionSet, RequestId};
