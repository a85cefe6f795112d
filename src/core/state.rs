//! Permission request state types

use serde::{Deserialize, Serialize};

use super::types::{PermissionSet, RequestId};

/// State of the request currently held by a coordinator
///
/// A single call moves through
/// `Idle -> AcquiringHost -> {HostUnavailable | AwaitingResult} -> {Granted | Denied | Cancelled}`.
/// `HostUnavailable` also ends a request whose host died before answering.
/// `Failed` covers host faults and result timeouts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// No request inside the critical section
    #[default]
    Idle,

    /// Waiting for a usable host
    AcquiringHost,

    /// Prompt presented, waiting for the host to report back
    AwaitingResult {
        /// Id of the armed request
        request_id: RequestId,
    },

    /// Every requested permission was granted
    Granted,

    /// At least one requested permission was denied
    Denied {
        /// The denied subset
        denied: PermissionSet,
    },

    /// No host became usable in time
    HostUnavailable,

    /// The caller abandoned the request
    Cancelled,

    /// The host faulted or never answered
    Failed {
        /// Error message
        message: String,
    },
}

impl RequestState {
    /// Check if this is a terminal state for a single call
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Granted
                | RequestState::Denied { .. }
                | RequestState::HostUnavailable
                | RequestState::Cancelled
                | RequestState::Failed { .. }
        )
    }

    /// Check if a request is currently inside the critical section
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RequestState::AcquiringHost | RequestState::AwaitingResult { .. }
        )
    }

    /// Create a failed state
    pub fn failed(msg: impl Into<String>) -> Self {
        RequestState::Failed {
            message: msg.into(),
        }
    }

    /// Create an awaiting result state
    pub fn awaiting(request_id: RequestId) -> Self {
        RequestState::AwaitingResult { request_id }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestState::Idle => write!(f, "Idle"),
            RequestState::AcquiringHost => write!(f, "Acquiring host"),
            RequestState::AwaitingResult { request_id } => {
                write!(f, "Awaiting result: {}", request_id)
            }
            RequestState::Granted => write!(f, "Granted"),
            RequestState::Denied { denied } => write!(f, "Denied: {:?}", denied),
            RequestState::HostUnavailable => write!(f, "Host unavailable"),
            RequestState::Cancelled => write!(f, "Cancelled"),
            RequestState::Failed { message } => write!(f, "Failed: {}", message),
        }
    }
}
