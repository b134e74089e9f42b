//! Registry configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default idle time after which an un-ended session is reclaimed
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Default period of the idle sweep
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// What `start` does when the key already maps to a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStartPolicy {
    /// Discard the live session and start over
    #[default]
    Replace,
    /// Refuse the new start
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// `None` disables the idle sweep
    pub idle_timeout: Option<Duration>,
    pub sweep_interval: Duration,
    pub duplicate_start: DuplicateStartPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            duplicate_start: DuplicateStartPolicy::default(),
        }
    }
}

impl RegistryConfig {
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_duplicate_start(mut self, policy: DuplicateStartPolicy) -> Self {
        self.duplicate_start = policy;
        self
    }
}
