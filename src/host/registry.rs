//! Host Registry
//!
//! Tracks the hosts able to present permission prompts:
//! - a keyed list of weakly held candidates (every host ever registered)
//! - the weakly held "current" host (the most recently registered one)
//!
//! Nothing here extends a host's lifetime. A dropped host simply stops
//! upgrading and is pruned on the next registration.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::watch;

use super::host::PermissionHost;

type WeakHost = Weak<dyn PermissionHost>;

#[derive(Default)]
struct HostSlots {
    current: Option<WeakHost>,
    candidates: Vec<(String, WeakHost)>,
}

fn upgrade_usable(weak: &WeakHost) -> Option<Arc<dyn PermissionHost>> {
    weak.upgrade().filter(|host| host.is_usable())
}

/// Registry of hosts able to present permission prompts
pub struct HostRegistry {
    slots: RwLock<HostSlots>,
    /// Bumped on every registration
    generation: watch::Sender<u64>,
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            slots: RwLock::new(HostSlots::default()),
            generation,
        }
    }

    /// Record `host` as the current host and as a candidate
    ///
    /// Call it whenever a host becomes usable (e.g. its screen starts).
    /// A candidate with the same key is replaced.
    pub fn register<H: PermissionHost + 'static>(&self, host: &Arc<H>) {
        let weak: Weak<H> = Arc::downgrade(host);
        let weak: WeakHost = weak;
        let key = host.key().to_string();

        {
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            slots
                .candidates
                .retain(|(k, candidate)| *k != key && candidate.strong_count() > 0);
            slots.candidates.push((key.clone(), weak.clone()));
            slots.current = Some(weak);
        }

        tracing::info!("Registered permission host: {}", key);
        self.generation.send_modify(|generation| *generation += 1);
    }

    /// Forget the host registered under `key`
    ///
    /// Dropping the host has the same effect; this is for explicit teardown.
    pub fn deregister(&self, key: &str) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.candidates.retain(|(k, _)| k != key);

        let current_matches = slots
            .current
            .as_ref()
            .is_some_and(|weak| weak.upgrade().map_or(true, |host| host.key() == key));
        if current_matches {
            slots.current = None;
        }
        tracing::debug!("Deregistered permission host: {}", key);
    }

    /// Get a usable host without waiting
    ///
    /// Prefers the current host, otherwise takes the first usable candidate
    /// and makes it current.
    pub fn current_usable(&self) -> Option<Arc<dyn PermissionHost>> {
        let fallback = {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(host) = slots.current.as_ref().and_then(upgrade_usable) {
                return Some(host);
            }
            slots
                .candidates
                .iter()
                .find_map(|(_, weak)| upgrade_usable(weak).map(|host| (weak.clone(), host)))
        };

        let (weak, host) = fallback?;
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        // A registration may have landed since the read lock was released
        if let Some(current) = slots.current.as_ref().and_then(upgrade_usable) {
            return Some(current);
        }
        slots.current = Some(weak);
        tracing::debug!("Promoted permission host to current: {}", host.key());
        Some(host)
    }

    /// Get the usable host registered under `key`, if any
    pub fn usable_by_key(&self, key: &str) -> Option<Arc<dyn PermissionHost>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .candidates
            .iter()
            .filter(|(k, _)| k == key)
            .find_map(|(_, weak)| upgrade_usable(weak))
    }

    /// Wait until a host registers after this call and is usable
    ///
    /// Cancel by dropping the future.
    pub async fn await_next(&self) -> Arc<dyn PermissionHost> {
        let mut registrations = self.registrations();
        loop {
            if registrations.changed().await.is_err() {
                // The sender lives as long as `self`, so this cannot happen
                return std::future::pending().await;
            }
            if let Some(host) = self.current_usable() {
                return host;
            }
        }
    }

    /// Subscribe to registration notifications
    ///
    /// The receiver only observes registrations made after this call.
    pub fn registrations(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Number of candidates whose host is still alive
    pub fn live_count(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .candidates
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for HostRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostRegistry")
            .field("live", &self.live_count())
            .field("generation", &*self.generation.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RequestId;
    use crate::host::PromptRequest;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct TestHost {
        key: String,
        usable: AtomicBool,
    }

    impl TestHost {
        fn new(key: &str) -> Arc<Self> {
            Arc::new(Self {
                key: key.to_string(),
                usable: AtomicBool::new(true),
            })
        }

        fn destroy(&self) {
            self.usable.store(false, Ordering::SeqCst);
        }
    }

    impl PermissionHost for TestHost {
        fn key(&self) -> &str {
            &self.key
        }

        fn is_usable(&self) -> bool {
            self.usable.load(Ordering::SeqCst)
        }

        fn present(&self, _prompt: PromptRequest) -> anyhow::Result<()> {
            Ok(())
        }

        fn cancel_prompt(&self, _request_id: RequestId) {}
    }

    #[test]
    fn test_empty_registry() {
        let registry = HostRegistry::new();
        assert!(registry.current_usable().is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_prefers_most_recent() {
        let registry = HostRegistry::new();
        let first = TestHost::new("first");
        let second = TestHost::new("second");

        registry.register(&first);
        registry.register(&second);

        assert_eq!(registry.current_usable().unwrap().key(), "second");
    }

    #[test]
    fn test_falls_back_to_usable_candidate() {
        let registry = HostRegistry::new();
        let first = TestHost::new("first");
        let second = TestHost::new("second");

        registry.register(&first);
        registry.register(&second);
        second.destroy();

        assert_eq!(registry.current_usable().unwrap().key(), "first");

        // First is now current even if second comes back
        second.usable.store(true, Ordering::SeqCst);
        assert_eq!(registry.current_usable().unwrap().key(), "first");
    }

    #[test]
    fn test_does_not_retain_hosts() {
        let registry = HostRegistry::new();
        let host = TestHost::new("screen");
        registry.register(&host);
        assert_eq!(registry.live_count(), 1);

        drop(host);

        assert_eq!(registry.live_count(), 0);
        assert!(registry.current_usable().is_none());
    }

    #[test]
    fn test_reregistration_replaces_candidate() {
        let registry = HostRegistry::new();
        let old = TestHost::new("main");
        registry.register(&old);
        let new = TestHost::new("main");
        registry.register(&new);

        assert_eq!(registry.live_count(), 1);
        old.destroy();
        assert!(registry.current_usable().is_some());
    }

    #[test]
    fn test_deregister() {
        let registry = HostRegistry::new();
        let first = TestHost::new("first");
        let second = TestHost::new("second");
        registry.register(&first);
        registry.register(&second);

        registry.deregister("second");

        assert_eq!(registry.current_usable().unwrap().key(), "first");
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_usable_by_key() {
        let registry = HostRegistry::new();
        let main = TestHost::new("main");
        let other = TestHost::new("other");
        registry.register(&main);
        registry.register(&other);

        assert_eq!(registry.usable_by_key("main").unwrap().key(), "main");
        main.destroy();
        assert!(registry.usable_by_key("main").is_none());
        assert!(registry.usable_by_key("missing").is_none());
    }

    #[test]
    fn test_promotion_does_not_override_concurrent_registration() {
        for _ in 0..500 {
            let registry = HostRegistry::new();
            let old = TestHost::new("old");
            let dead = TestHost::new("dead");
            registry.register(&old);
            registry.register(&dead);
            dead.destroy();
            let newest = TestHost::new("newest");

            let barrier = std::sync::Barrier::new(2);
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    registry.current_usable();
                });
                scope.spawn(|| {
                    barrier.wait();
                    registry.register(&newest);
                });
            });

            assert_eq!(registry.current_usable().unwrap().key(), "newest");
        }
    }

    #[tokio::test]
    async fn test_await_next_resolves_on_registration() {
        let registry = Arc::new(HostRegistry::new());
        let host = TestHost::new("late");

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.await_next().await.key().to_string() })
        };

        tokio::task::yield_now().await;
        registry.register(&host);

        let key = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(key, "late");
    }

    #[tokio::test]
    async fn test_await_next_ignores_existing_hosts() {
        let registry = HostRegistry::new();
        let host = TestHost::new("existing");
        registry.register(&host);

        let result =
            tokio::time::timeout(Duration::from_millis(50), registry.await_next()).await;
        assert!(result.is_err());
    }
}
