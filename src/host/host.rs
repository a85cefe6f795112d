//! Host trait definition
//!
//! A host is the UI surface able to show the system permission prompt and
//! report the user's answer back to the coordinator.

use anyhow::Result;

use crate::core::{PermissionSet, RequestId};

/// A prompt the coordinator asks a host to present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Id the host must echo back with the result
    pub request_id: RequestId,
    /// Permissions to ask for
    pub permissions: PermissionSet,
}

impl PromptRequest {
    /// Create a new prompt request
    pub fn new(request_id: RequestId, permissions: PermissionSet) -> Self {
        Self {
            request_id,
            permissions,
        }
    }
}

/// Trait for UI hosts that can present permission prompts
///
/// Hosts are only ever referenced weakly by the registry; their own
/// lifecycle decides when they stop being usable.
pub trait PermissionHost: Send + Sync {
    /// Stable key identifying this host among registered candidates
    fn key(&self) -> &str;

    /// Whether the host can currently present a prompt
    fn is_usable(&self) -> bool;

    /// Launch the system prompt for `prompt`
    ///
    /// The answer is reported later through
    /// `PermissionCoordinator::on_permission_result` with the same request id.
    /// Must not block. A host torn down between selection and dispatch may
    /// silently ignore the call.
    fn present(&self, prompt: PromptRequest) -> Result<()>;

    /// Release whatever the host keeps for an abandoned request
    ///
    /// Called when the coordinator stops waiting without having received a
    /// result (cancellation, result timeout, dispatch failure).
    fn cancel_prompt(&self, _request_id: RequestId) {}
}
