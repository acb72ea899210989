//! Exponential backoff with jitter for collector retries.

use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;

/// Retry schedule for one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    max_attempts: u32,
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(max_attempts: u32, base_ms: u64, max_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_ms,
            max_ms,
        }
    }

    /// Whether another attempt is allowed after `attempt` attempts have been made.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `attempt` (1-based), capped, plus up to 10% jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponential_base = 2u64.saturating_pow(attempt - 1);
        let capped_delay = self.base_ms.saturating_mul(exponential_base).min(self.max_ms);

        let jitter_range = capped_delay / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped_delay + jitter)
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay_ms, config.max_delay_ms)
    }
}
