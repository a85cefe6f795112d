//! Permission coordinator
//!
//! Turns the host's prompt/callback flow into one awaitable call:
//!
//! 1. Enter the critical section (one request in flight at a time)
//! 2. Find a usable host, waiting up to `poll_interval x max_attempts`
//! 3. Arm the pending slot and have the host present the prompt
//! 4. Await the host's result (or caller cancellation) and classify it,
//!    giving up if the host dies and no replacement shows up in time
//!
//! Every exit path disarms the slot, releases the host-side prompt if no
//! result came back, and leaves the critical section.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::CoordinatorConfig;
use crate::core::{
    CoordinatorEvent, CoordinatorResult, GrantMap, PermissionError, PermissionSet, RequestId,
    RequestState,
};
use crate::host::{HostRegistry, PermissionHost, PromptRequest};

use super::checker::{classify, PermissionChecker};
use super::grants::GrantStatus;
use super::pending::{PendingSlot, ResultReceiver};

/// Receiver for coordinator events
pub type EventReceiver = broadcast::Receiver<CoordinatorEvent>;

/// What happened to a result reported by a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Routed to the caller waiting on the armed request
    Delivered,
    /// No armed request matched the id, or its caller already left
    Dropped,
}

/// Serializes permission requests through whichever host is usable
///
/// Calls are serviced one at a time in the order they reach the internal
/// mutex. Tokio's mutex is fair, so waiting callers proceed FIFO.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(HostRegistry::new());
/// let coordinator = Arc::new(PermissionCoordinator::new(registry.clone(), CoordinatorConfig::default())?);
///
/// // UI shell: registry.register(&screen) when a screen starts,
/// // coordinator.on_permission_result(id, grants) when the prompt answers.
///
/// coordinator.check_permissions(permission_set(["android.permission.CAMERA"])).await?;
/// ```
pub struct PermissionCoordinator {
    config: CoordinatorConfig,
    registry: Arc<HostRegistry>,
    grant_status: Option<Arc<dyn GrantStatus>>,
    /// Guards request sequencing, not the host reference
    turn: Mutex<()>,
    pending: PendingSlot,
    state: RwLock<RequestState>,
    events: broadcast::Sender<CoordinatorEvent>,
}

impl PermissionCoordinator {
    /// Create a coordinator backed by `registry`
    pub fn new(registry: Arc<HostRegistry>, config: CoordinatorConfig) -> CoordinatorResult<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity);
        Ok(Self {
            config,
            registry,
            grant_status: None,
            turn: Mutex::new(()),
            pending: PendingSlot::new(),
            state: RwLock::new(RequestState::Idle),
            events,
        })
    }

    /// Use `status` to skip prompting for permissions already held
    pub fn with_grant_status(mut self, status: Arc<dyn GrantStatus>) -> Self {
        self.grant_status = Some(status);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Get the host registry
    pub fn registry(&self) -> &Arc<HostRegistry> {
        &self.registry
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Make sure every permission in `permissions` is granted
    ///
    /// Prompts through a usable host unless everything is already granted.
    /// Dropping the returned future cancels the request: the slot is
    /// disarmed, the host releases its prompt and the mutex is freed.
    pub async fn check_permissions(&self, permissions: PermissionSet) -> CoordinatorResult<()> {
        if permissions.is_empty() {
            return Err(PermissionError::EmptyRequest);
        }

        let _turn = self.turn.lock().await;
        let mut call = CallGuard {
            coordinator: self,
            finished: false,
        };

        let outcome = self.run_request(&permissions).await;
        call.finish(&outcome);
        outcome
    }

    /// Like [`check_permissions`](Self::check_permissions), abandoning the
    /// request with `Cancelled` once `cancel` fires
    pub async fn check_permissions_until(
        &self,
        permissions: PermissionSet,
        cancel: CancellationToken,
    ) -> CoordinatorResult<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Permission request cancelled by token");
                Err(PermissionError::Cancelled)
            }
            outcome = self.check_permissions(permissions) => outcome,
        }
    }

    async fn run_request(&self, permissions: &PermissionSet) -> CoordinatorResult<()> {
        if self.already_granted(permissions) {
            tracing::debug!("All permissions already granted: {:?}", permissions);
            return Ok(());
        }

        self.set_state(RequestState::AcquiringHost);
        let host = self.acquire_host().await?;

        let request_id = RequestId::new();
        let receiver = self.pending.arm(request_id, permissions.clone());
        let host_key = host.key().to_string();
        let armed = ArmedRequest {
            pending: &self.pending,
            request_id,
            host: Arc::downgrade(&host),
        };
        self.set_state(RequestState::awaiting(request_id));

        tracing::info!(
            "Presenting permission prompt {} via {}: {:?}",
            request_id,
            host.key(),
            permissions
        );
        host.present(PromptRequest::new(request_id, permissions.clone()))
            .map_err(|e| {
                tracing::warn!("Host {} failed to present prompt: {}", host.key(), e);
                PermissionError::host_fault(e.to_string())
            })?;
        // Only the weak handle in `armed` may outlive the dispatch
        drop(host);
        let _ = self
            .events
            .send(CoordinatorEvent::prompt_presented(request_id, permissions.clone()));

        let waiting = self.await_result(request_id, receiver, &armed.host, &host_key);
        let grants = match self.config.result_timeout() {
            Some(limit) => tokio::time::timeout(limit, waiting).await.map_err(|_| {
                tracing::warn!("No result for prompt {} within {:?}", request_id, limit);
                PermissionError::ResultTimedOut
            })??,
            None => waiting.await?,
        };

        classify(permissions, &grants)
    }

    /// Wait for the result of the armed request
    ///
    /// A host may drop a prompt silently when it is torn down around the
    /// dispatch. Every watch tick checks that the presenting host, or a host
    /// recreated under the same key, is still usable. Once none has been for
    /// the acquisition budget the request fails with `HostLost`.
    async fn await_result(
        &self,
        request_id: RequestId,
        mut receiver: ResultReceiver,
        host: &Weak<dyn PermissionHost>,
        host_key: &str,
    ) -> CoordinatorResult<GrantMap> {
        let budget = self.config.acquisition_budget();
        let interval = self.config.host_watch_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        let mut lost_since: Option<Instant> = None;

        loop {
            tokio::select! {
                received = &mut receiver => {
                    return received.map_err(|_| {
                        PermissionError::host_fault("pending request discarded without a result")
                    });
                }
                _ = ticker.tick() => {}
            }

            let alive = host.upgrade().is_some_and(|host| host.is_usable())
                || self.registry.usable_by_key(host_key).is_some();
            if alive {
                if lost_since.take().is_some() {
                    tracing::debug!("Host {} is back for prompt {}", host_key, request_id);
                }
                continue;
            }

            let since = *lost_since.get_or_insert_with(|| {
                tracing::debug!("Host {} gone while awaiting prompt {}", host_key, request_id);
                Instant::now()
            });
            let waited = since.elapsed();
            if waited >= budget {
                tracing::warn!(
                    "Host {} lost with prompt {} unanswered, no replacement after {:?}",
                    host_key,
                    request_id,
                    waited
                );
                return Err(PermissionError::HostLost { waited });
            }
        }
    }

    fn already_granted(&self, permissions: &PermissionSet) -> bool {
        if !self.config.skip_if_granted {
            return false;
        }
        match &self.grant_status {
            Some(status) => status.all_granted(permissions),
            None => false,
        }
    }

    /// Wait for a usable host within the acquisition budget
    ///
    /// Re-checks on every poll tick and on every registration.
    async fn acquire_host(&self) -> CoordinatorResult<Arc<dyn PermissionHost>> {
        let mut registrations = self.registry.registrations();
        if let Some(host) = self.registry.current_usable() {
            return Ok(host);
        }

        let started = Instant::now();
        let budget = self.config.acquisition_budget();
        if budget.is_zero() {
            return Err(PermissionError::HostUnavailable { waited: budget });
        }

        let deadline = started + budget;
        let interval = self.config.poll_interval();
        let mut ticker = tokio::time::interval_at(started + interval, interval);
        let mut watching = true;

        tracing::debug!("No usable host, waiting up to {:?}", budget);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = registrations.changed(), if watching => {
                    watching = changed.is_ok();
                }
                _ = tokio::time::sleep_until(deadline) => {}
            }

            if let Some(host) = self.registry.current_usable() {
                tracing::debug!("Acquired host {} after {:?}", host.key(), started.elapsed());
                return Ok(host);
            }
            if Instant::now() >= deadline {
                let waited = started.elapsed();
                tracing::warn!("No usable permission host after {:?}", waited);
                return Err(PermissionError::HostUnavailable { waited });
            }
        }
    }

    // =========================================================================
    // Host callbacks
    // =========================================================================

    /// Accept a prompt result from a host
    ///
    /// Only the request currently armed under `request_id` receives it;
    /// anything else (late answers to abandoned prompts) is dropped.
    pub fn on_permission_result(&self, request_id: RequestId, grants: GrantMap) -> Delivery {
        if let Some(pending) = self.pending.take(request_id) {
            if pending.resolve(grants) {
                tracing::debug!("Delivered permission result for {}", request_id);
                return Delivery::Delivered;
            }
            tracing::debug!("Caller of {} left before its result arrived", request_id);
            return Delivery::Dropped;
        }

        tracing::warn!("Dropping permission result for unknown request {}", request_id);
        let _ = self.events.send(CoordinatorEvent::ResultDropped { request_id, grants });
        Delivery::Dropped
    }

    // =========================================================================
    // State and events
    // =========================================================================

    /// Current request state
    pub fn state(&self) -> RequestState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Id of the request currently waiting for a result
    pub fn armed_request(&self) -> Option<RequestId> {
        self.pending.armed_id()
    }

    /// Subscribe to coordinator events from this point forward
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    fn set_state(&self, new_state: RequestState) {
        tracing::debug!("Permission request state: {}", new_state);
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = new_state.clone();
        }
        let _ = self.events.send(CoordinatorEvent::StateChange(new_state));
    }
}

#[async_trait]
impl PermissionChecker for PermissionCoordinator {
    async fn check_permissions(&self, permissions: PermissionSet) -> CoordinatorResult<()> {
        PermissionCoordinator::check_permissions(self, permissions).await
    }
}

/// Publishes the terminal state of a call, `Cancelled` if it was dropped
struct CallGuard<'a> {
    coordinator: &'a PermissionCoordinator,
    finished: bool,
}

impl CallGuard<'_> {
    fn finish(&mut self, outcome: &CoordinatorResult<()>) {
        let terminal = match outcome {
            Ok(()) => RequestState::Granted,
            Err(PermissionError::Denied { denied }) => RequestState::Denied {
                denied: denied.clone(),
            },
            Err(PermissionError::HostUnavailable { .. } | PermissionError::HostLost { .. }) => {
                RequestState::HostUnavailable
            }
            Err(PermissionError::Cancelled) => RequestState::Cancelled,
            Err(e) => RequestState::failed(e.to_string()),
        };
        self.finished = true;
        self.coordinator.set_state(terminal);
        self.coordinator.set_state(RequestState::Idle);
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Permission request abandoned by caller");
            self.coordinator.set_state(RequestState::Cancelled);
            self.coordinator.set_state(RequestState::Idle);
        }
    }
}

/// Disarms the pending slot on every exit path
///
/// If the request was still armed (no result arrived), the host is asked to
/// release its prompt so a late answer cannot fire into discarded state.
struct ArmedRequest<'a> {
    pending: &'a PendingSlot,
    request_id: RequestId,
    host: Weak<dyn PermissionHost>,
}

impl Drop for ArmedRequest<'_> {
    fn drop(&mut self) {
        if self.pending.disarm(self.request_id) {
            if let Some(host) = self.host.upgrade() {
                host.cancel_prompt(self.request_id);
            }
            tracing::debug!("Disarmed permission request {}", self.request_id);
        }
    }
}
