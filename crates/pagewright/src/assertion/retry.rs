//! Bounded polling for with-retry resolution and retrying verifications.
//!
//! The loop blocks the calling thread; callers only observe latency. There is
//! no cancellation beyond the timeout itself.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::result::PageResult;

/// Polling schedule for retried lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total timeout duration (zero means a single attempt)
    pub timeout: Duration,
    /// Interval between retry attempts
    pub poll_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with timeout
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(50),
        }
    }

    /// Single attempt, no waiting
    #[must_use]
    pub const fn once() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Outcome of a polling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    /// The value produced by the first successful attempt, if any
    pub value: Option<T>,
    /// Number of attempts made
    pub attempts: usize,
    /// Total time spent
    pub duration: Duration,
}

impl<T> RetryOutcome<T> {
    /// Whether an attempt succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.value.is_some()
    }
}

/// Poll `attempt` until it yields `Some`, the timeout elapses, or it errors.
///
/// Errors from `attempt` abort immediately; they are never retried.
pub fn poll_until<T, F>(config: &RetryConfig, mut attempt: F) -> PageResult<RetryOutcome<T>>
where
    F: FnMut() -> PageResult<Option<T>>,
{
    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        if let Some(value) = attempt()? {
            return Ok(RetryOutcome {
                value: Some(value),
                attempts,
                duration: start.elapsed(),
            });
        }

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            tracing::trace!(attempts, elapsed_ms = elapsed.as_millis() as u64, "poll gave up");
            return Ok(RetryOutcome {
                value: None,
                attempts,
                duration: elapsed,
            });
        }

        std::thread::sleep(config.poll_interval.min(config.timeout - elapsed));
    }
}
