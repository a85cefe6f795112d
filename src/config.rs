//! Coordinator Configuration
//!
//! Timing knobs for host acquisition and result waiting.
//!
//! ```ignore
//! let config = CoordinatorConfig::new()
//!     .with_poll_interval_ms(250)
//!     .with_max_attempts(8)
//!     .with_result_timeout_ms(60_000);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::{CoordinatorResult, PermissionError};

/// Default interval between host availability checks
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default number of poll intervals to wait for a host
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default buffer size for the event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

const ENV_POLL_INTERVAL: &str = "PERMISSION_POLL_INTERVAL_MS";
const ENV_MAX_ATTEMPTS: &str = "PERMISSION_MAX_ATTEMPTS";
const ENV_RESULT_TIMEOUT: &str = "PERMISSION_RESULT_TIMEOUT_MS";

/// Configuration for a `PermissionCoordinator`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Interval between host availability checks in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of intervals to wait before failing with `HostUnavailable`
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Optional cap on how long to wait for the host's answer
    #[serde(default)]
    pub result_timeout_ms: Option<u64>,

    /// Skip the prompt when every permission is already granted
    #[serde(default = "default_skip_if_granted")]
    pub skip_if_granted: bool,

    /// Buffer size of the event channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_skip_if_granted() -> bool {
    true
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            result_timeout_ms: None,
            skip_if_granted: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl CoordinatorConfig {
    /// Create a configuration with the default 500ms x 3 acquisition budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the poll interval
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the number of poll attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Bound the wait for a host result
    pub fn with_result_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.result_timeout_ms = Some(timeout_ms);
        self
    }

    /// Enable or disable the already-granted short-circuit
    pub fn with_skip_if_granted(mut self, skip: bool) -> Self {
        self.skip_if_granted = skip;
        self
    }

    /// Set the event channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Get the poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Total time the coordinator waits for a host before giving up
    pub fn acquisition_budget(&self) -> Duration {
        self.poll_interval() * self.max_attempts
    }

    /// How often a dispatched request checks that its host is still alive
    ///
    /// Falls back to the default interval when polling is disabled.
    pub fn host_watch_interval(&self) -> Duration {
        match self.poll_interval_ms {
            0 => Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            ms => Duration::from_millis(ms),
        }
    }

    /// Get the result timeout as Duration
    pub fn result_timeout(&self) -> Option<Duration> {
        self.result_timeout_ms.map(Duration::from_millis)
    }

    /// Check the configuration for values the coordinator cannot work with
    pub fn validate(&self) -> CoordinatorResult<()> {
        if self.poll_interval_ms == 0 && self.max_attempts > 0 {
            return Err(PermissionError::InvalidConfig(
                "poll_interval_ms must be positive when max_attempts > 0".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(PermissionError::InvalidConfig(
                "event_capacity must be positive".into(),
            ));
        }
        if self.result_timeout_ms == Some(0) {
            return Err(PermissionError::InvalidConfig(
                "result_timeout_ms must be positive when set".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> CoordinatorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> CoordinatorResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Build a configuration from `PERMISSION_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> CoordinatorResult<Self> {
        let mut config = Self::default();
        if let Some(value) = env_number(ENV_POLL_INTERVAL)? {
            config.poll_interval_ms = value;
        }
        if let Some(value) = env_number(ENV_MAX_ATTEMPTS)? {
            config.max_attempts = u32::try_from(value).map_err(|_| {
                PermissionError::InvalidConfig(format!("{} is out of range", ENV_MAX_ATTEMPTS))
            })?;
        }
        if let Some(value) = env_number(ENV_RESULT_TIMEOUT)? {
            config.result_timeout_ms = Some(value);
        }
        config.validate()?;
        Ok(config)
    }
}

fn env_number(key: &str) -> CoordinatorResult<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PermissionError::InvalidConfig(format!("{} is not a number: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
