//! The single pending-request slot
//!
//! Bridges the host's push-style result callback to the awaiting caller.
//! At most one request is armed at a time; arming hands out the receiving
//! half of a oneshot channel and a delivery takes the sending half out of
//! the slot, so a result can be delivered at most once.

use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::core::{GrantMap, PermissionSet, RequestId};

/// Receiving half handed to the waiting caller
pub type ResultReceiver = oneshot::Receiver<GrantMap>;

/// Sending half kept in the slot
pub type ResultSender = oneshot::Sender<GrantMap>;

/// The request currently waiting for a host result
#[derive(Debug)]
pub struct PendingRequest {
    /// Id echoed back by the host
    pub request_id: RequestId,
    /// Permissions shown in the prompt
    pub permissions: PermissionSet,
    responder: ResultSender,
}

impl PendingRequest {
    /// Resolve the waiting caller
    ///
    /// Returns false if the caller already stopped waiting.
    pub fn resolve(self, grants: GrantMap) -> bool {
        self.responder.send(grants).is_ok()
    }
}

/// Slot holding at most one pending request
#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<PendingRequest>>,
}

impl PendingSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot for `request_id`
    ///
    /// Any previously armed request is discarded, which resolves its
    /// receiver with a closed-channel error.
    pub fn arm(&self, request_id: RequestId, permissions: PermissionSet) -> ResultReceiver {
        let (responder, receiver) = oneshot::channel();
        let previous = self.lock().replace(PendingRequest {
            request_id,
            permissions,
            responder,
        });
        if let Some(previous) = previous {
            tracing::warn!(
                "Discarding pending request {} replaced by {}",
                previous.request_id,
                request_id
            );
        }
        receiver
    }

    /// Take the pending request if it is the one armed for `request_id`
    pub fn take(&self, request_id: RequestId) -> Option<PendingRequest> {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(pending) if pending.request_id == request_id => slot.take(),
            _ => None,
        }
    }

    /// Disarm `request_id` without a result
    ///
    /// Returns true if it was still armed.
    pub fn disarm(&self, request_id: RequestId) -> bool {
        self.take(request_id).is_some()
    }

    /// Id of the armed request, if any
    pub fn armed_id(&self) -> Option<RequestId> {
        self.lock().as_ref().map(|pending| pending.request_id)
    }

    /// Check if a request is armed
    pub fn is_armed(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingRequest>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
