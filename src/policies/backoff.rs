//! # Backoff between forward attempts.
//!
//! [`BackoffPolicy`] controls how the delay between retries of a failed forward grows.
//! The delay for attempt `n` (0-indexed) is `first × factor^n`, clamped to `max`,
//! then jitter is applied. The base is derived from the attempt number alone, so a
//! jittered delay never feeds into the next one.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use evbroker::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(2), Duration::from_millis(400));
//! assert_eq!(backoff.next(5), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry delay schedule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Upper bound for any single delay.
    pub max: Duration,
    /// Multiplicative growth per attempt (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `factor = 2.0`, `max = 5s`, equal jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::Equal,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay to wait after the given (0-indexed) failed attempt.
    ///
    /// Growth that overflows `Duration`, goes negative or is NaN collapses to
    /// [`BackoffPolicy::max`].
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let grown = self.first.as_secs_f64() * self.factor.powi(exp);
        let base = Duration::try_from_secs_f64(grown).map_or(self.max, |d| d.min(self.max));

        match self.jitter {
            JitterPolicy::Decorrelated => {
                let floor = self.first.min(self.max);
                self.jitter.apply_decorrelated(floor, base, self.max)
            }
            jitter => jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(first_ms: u64, max_ms: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_millis(max_ms),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn test_exponential_growth_no_jitter() {
        let policy = plain(100, 30_000, 2.0);
        let got: Vec<_> = (0..5).map(|n| policy.next(n).as_millis()).collect();
        assert_eq!(got, vec![100, 200, 400, 800, 1600]);
    }

    #[test]
    fn test_constant_factor() {
        let policy = plain(250, 30_000, 1.0);
        for attempt in 0..8 {
            assert_eq!(policy.next(attempt), Duration::from_millis(250));
        }
    }

    #[test]
    fn test_first_exceeds_max() {
        let policy = plain(10_000, 5_000, 2.0);
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn test_overflow_clamps_to_max() {
        let policy = plain(100, 10_000, 2.0);
        assert_eq!(policy.next(200), Duration::from_secs(10));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_default_equal_jitter_stays_in_band() {
        let policy = BackoffPolicy::default();
        for attempt in 0..12 {
            let base = (100.0 * 2.0f64.powi(attempt as i32)).min(5_000.0);
            let delay = policy.next(attempt).as_millis() as f64;
            assert!(delay >= (base / 2.0).floor(), "attempt {attempt}: {delay} < half of {base}");
            assert!(delay <= base, "attempt {attempt}: {delay} > {base}");
        }
    }

    #[test]
    fn test_decorrelated_has_floor_and_cap() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Decorrelated,
            ..plain(100, 2_000, 2.0)
        };
        for _ in 0..50 {
            let delay = policy.next(6);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(2_000));
        }
    }
}
