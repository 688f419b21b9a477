//! Retry pacing for shard clients.

use std::time::Duration;

use accessmux_config::ClientConfig;

use super::error::Error;

/// Decides whether and when to retry a failed shard call.
///
/// A strategy owns both halves of the decision: classifying the error and
/// pacing the retry. Swapping in a custom strategy replaces both.
pub trait RetryStrategy: Send + Sync {
    /// Delay before the next attempt, or `None` to give up. `attempt` is
    /// the number of attempts already made (starting at 1).
    fn next_delay(&self, attempt: u32, error: &Error) -> Option<Duration>;
}

/// The default strategy: transient transport failures are retried a bounded
/// number of times with a fixed pause; HTTP error responses never are,
/// since the backend would deterministically produce them again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedInterval {
    retries: u32,
    interval: Duration,
}

impl FixedInterval {
    pub fn new(retries: u32, interval: Duration) -> Self {
        Self { retries, interval }
    }
}

impl From<&ClientConfig> for FixedInterval {
    fn from(config: &ClientConfig) -> Self {
        Self::new(config.retry_count, config.retry_interval())
    }
}

impl RetryStrategy for FixedInterval {
    fn next_delay(&self, attempt: u32, error: &Error) -> Option<Duration> {
        if error.is_transient() && attempt <= self.retries {
            Some(self.interval)
        } else {
            None
        }
    }
}
