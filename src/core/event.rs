//! Events published by a coordinator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::RequestState;
use super::types::{GrantMap, PermissionSet, RequestId};

/// Events streamed FROM a coordinator to its subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CoordinatorEvent {
    /// The request state changed
    StateChange(RequestState),

    /// A prompt was handed to a host
    PromptPresented {
        /// Id of the armed request
        request_id: RequestId,
        /// Permissions shown in the prompt
        permissions: PermissionSet,
        /// When the prompt was dispatched
        at: DateTime<Utc>,
    },

    /// A host reported a result nobody was waiting for
    ResultDropped {
        /// Id the host reported the result for
        request_id: RequestId,
        /// The discarded answer
        grants: GrantMap,
    },
}

impl CoordinatorEvent {
    /// Create a prompt presented event stamped with the current time
    pub fn prompt_presented(request_id: RequestId, permissions: PermissionSet) -> Self {
        CoordinatorEvent::PromptPresented {
            request_id,
            permissions,
            at: Utc::now(),
        }
    }

    /// The new state, if this is a state change
    pub fn as_state(&self) -> Option<&RequestState> {
        match self {
            CoordinatorEvent::StateChange(state) => Some(state),
            _ => None,
        }
    }
}
