//! # Retry policy for outbound forwarders.
//!
//! [`RetryPolicy`] bounds how many times a consumer loop hands the same event to a
//! failing [`Forward`](crate::Forward) before logging and dropping it.
//!
//! ```text
//! attempt 0 ─► send ─ Err(retryable) ─► sleep(backoff.next(0)) ─► attempt 1 ─► ...
//!                    └ Ok / Err(non-retryable) / last attempt ─► done
//! ```

use std::time::Duration;

use crate::policies::backoff::BackoffPolicy;

/// How often and how patiently a failed forward is retried.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per event, including the first (`0` is treated as `1`).
    pub max_attempts: u32,
    /// Delay schedule between attempts.
    pub backoff: BackoffPolicy,
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Total attempts clamped to a minimum of 1.
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given (0-indexed) failed attempt.
    #[inline]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.next(attempt)
    }
}

impl Default for RetryPolicy {
    /// Three attempts with [`BackoffPolicy::default`].
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}
