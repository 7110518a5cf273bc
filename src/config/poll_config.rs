//! Deadline, backoff and transport settings for a run

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigError;

/// Settings consumed by the poll engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Overall deadline in seconds
    pub deadline_secs: u64,

    /// Backoff between failed attempts
    #[serde(default)]
    pub backoff: BackoffPolicy,

    /// Per-request transport timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Dump raw request and response details
    #[serde(default)]
    pub debug: bool,
}

fn default_request_timeout() -> u64 {
    30000
}

impl PollConfig {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline_secs: deadline.as_secs(),
            backoff: BackoffPolicy::default(),
            request_timeout: default_request_timeout(),
            debug: false,
        }
    }

    /// Build from the `--timeout` flag, which is given in minutes
    pub fn from_timeout_minutes(minutes: u64) -> Result<Self, ConfigError> {
        if minutes == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self::new(Duration::from_secs(minutes.saturating_mul(60))))
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }
}

/// Exponential backoff curve: `initial_delay * multiplier^(n-1)`, capped at `max_delay`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: u32,

    /// Ceiling in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay: u64,
}

fn default_initial_delay() -> u64 {
    1000
}

fn default_multiplier() -> u32 {
    2
}

fn default_max_delay() -> u64 {
    10000
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            multiplier: default_multiplier(),
            max_delay: default_max_delay(),
        }
    }
}

impl BackoffPolicy {
    /// Wait before the next attempt, given how many attempts have failed so far
    ///
    /// Depends only on the failure count. Once the ceiling is reached it is
    /// held for every later failure.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        let delay = self
            .multiplier
            .checked_pow(exponent)
            .and_then(|factor| self.initial_delay.checked_mul(u64::from(factor)))
            .unwrap_or(self.max_delay);
        Duration::from_millis(delay.min(self.max_delay))
    }
}
