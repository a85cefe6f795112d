//! A scripted host
//!
//! Stands in for a real UI screen: it answers every prompt after a delay
//! using a policy closure, and can be "destroyed" to simulate teardown.
//! Used by the demo binary and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::core::{GrantMap, PermissionSet, RequestId};
use crate::permissions::{GrantLedger, PermissionCoordinator};

use super::host::{PermissionHost, PromptRequest};

/// Decides the user's answer for a prompt
pub type AnswerPolicy = Arc<dyn Fn(&PermissionSet) -> GrantMap + Send + Sync>;

/// Policy that grants everything
pub fn grant_all() -> AnswerPolicy {
    Arc::new(|permissions: &PermissionSet| {
        permissions.iter().map(|p| (p.clone(), true)).collect()
    })
}

/// Policy that denies everything
pub fn deny_all() -> AnswerPolicy {
    Arc::new(|permissions: &PermissionSet| {
        permissions.iter().map(|p| (p.clone(), false)).collect()
    })
}

/// Policy that denies exactly the listed permissions
pub fn deny_only(denied: PermissionSet) -> AnswerPolicy {
    Arc::new(move |permissions: &PermissionSet| {
        permissions
            .iter()
            .map(|p| (p.clone(), !denied.contains(p)))
            .collect()
    })
}

/// Host that answers prompts from a scripted policy
pub struct SimulatedHost {
    key: String,
    coordinator: Arc<PermissionCoordinator>,
    policy: AnswerPolicy,
    delay: Duration,
    ledger: Option<Arc<GrantLedger>>,
    usable: AtomicBool,
    presented: AtomicUsize,
    cancelled: AtomicUsize,
    in_flight: Mutex<HashMap<RequestId, JoinHandle<()>>>,
}

impl SimulatedHost {
    /// Create a host answering `coordinator`'s prompts with `policy`
    pub fn new(
        key: impl Into<String>,
        coordinator: Arc<PermissionCoordinator>,
        policy: AnswerPolicy,
    ) -> Self {
        Self {
            key: key.into(),
            coordinator,
            policy,
            delay: Duration::from_millis(100),
            ledger: None,
            usable: AtomicBool::new(true),
            presented: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Set how long the simulated user takes to answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Record granted permissions in `ledger`, like the platform would
    pub fn with_ledger(mut self, ledger: Arc<GrantLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Mark the host as torn down
    pub fn destroy(&self) {
        self.usable.store(false, Ordering::SeqCst);
        tracing::debug!("Simulated host destroyed: {}", self.key);
    }

    /// Number of prompts presented so far
    pub fn presented_count(&self) -> usize {
        self.presented.load(Ordering::SeqCst)
    }

    /// Number of prompts released by the coordinator before answering
    pub fn cancelled_count(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl PermissionHost for SimulatedHost {
    fn key(&self) -> &str {
        &self.key
    }

    fn is_usable(&self) -> bool {
        self.usable.load(Ordering::SeqCst)
    }

    fn present(&self, prompt: PromptRequest) -> Result<()> {
        if !self.is_usable() {
            tracing::debug!("Ignoring prompt on destroyed host: {}", self.key);
            return Ok(());
        }
        self.presented.fetch_add(1, Ordering::SeqCst);

        let coordinator = self.coordinator.clone();
        let policy = self.policy.clone();
        let ledger = self.ledger.clone();
        let delay = self.delay;
        let request_id = prompt.request_id;

        let answer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let grants = policy(&prompt.permissions);
            if let Some(ledger) = ledger {
                ledger.record(&grants);
            }
            coordinator.on_permission_result(request_id, grants);
        });

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|_, task| !task.is_finished());
        in_flight.insert(request_id, answer);
        Ok(())
    }

    fn cancel_prompt(&self, request_id: RequestId) {
        let task = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&request_id);
        if let Some(task) = task {
            task.abort();
            self.cancelled.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("Simulated host released prompt {}", request_id);
        }
    }
}
