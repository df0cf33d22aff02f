//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::WorkerConfig;

/// Capped exponential delay between restart attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.restart_base_delay_ms),
            Duration::from_millis(config.restart_max_delay_ms),
        )
    }

    /// Delay before the given attempt (1-based). Attempt 0 waits nothing.
    pub fn delay(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.base.as_millis() as u64,
            self.max.as_millis() as u64,
        )
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// Jitter adds up to 10% on top of the capped delay, so the result never
/// falls below the deterministic value.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}
