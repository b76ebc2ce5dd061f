//! # Jitter for retry delays.
//!
//! Several forwarders failing against the same downstream at once would otherwise
//! retry in lockstep. [`JitterPolicy`] spreads them out.
//!
//! - [`JitterPolicy::None`] exact delay
//! - [`JitterPolicy::Full`] random in `[0, delay]`
//! - [`JitterPolicy::Equal`] `delay/2 + random[0, delay/2]`
//! - [`JitterPolicy::Decorrelated`] random in `[base, min(prev × 3, max)]`

use rand::Rng;
use std::time::Duration;

/// Randomization strategy for retry delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the computed delay as is.
    #[default]
    None,
    /// Random delay in `[0, delay]`.
    Full,
    /// `delay/2 + random[0, delay/2]`.
    Equal,
    /// Random delay in `[base, prev × 3]`, capped at `max`.
    ///
    /// Needs extra context; see [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to `delay`.
    ///
    /// `Decorrelated` returns the input unchanged here.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => between(Duration::ZERO, delay),
            JitterPolicy::Equal => between(delay / 2, delay),
        }
    }

    /// Decorrelated jitter with explicit bounds.
    ///
    /// Falls back to [`apply`](Self::apply) on `prev` for the other variants.
    pub fn apply_decorrelated(&self, base: Duration, prev: Duration, max: Duration) -> Duration {
        match self {
            JitterPolicy::Decorrelated => between(base, prev.saturating_mul(3).min(max)),
            other => other.apply(prev),
        }
    }
}

/// Uniform sample in `[lo, hi]`; an empty range yields `lo`.
fn between(lo: Duration, hi: Duration) -> Duration {
    if hi <= lo {
        return lo;
    }
    rand::rng().random_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let d = Duration::from_millis(1234);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn test_full_bounds() {
        for _ in 0..100 {
            let d = JitterPolicy::Full.apply(Duration::from_millis(300));
            assert!(d <= Duration::from_millis(300));
        }
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_equal_bounds() {
        for _ in 0..100 {
            let d = JitterPolicy::Equal.apply(Duration::from_millis(1000));
            assert!(d >= Duration::from_millis(500));
            assert!(d <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_decorrelated_collapses_when_range_empty() {
        let base = Duration::from_millis(500);
        let prev = Duration::from_millis(100);
        let got = JitterPolicy::Decorrelated.apply_decorrelated(base, prev, base);
        assert_eq!(got, base);
    }

    #[test]
    fn test_decorrelated_stays_within_three_times_prev() {
        let base = Duration::from_millis(10);
        let prev = Duration::from_millis(40);
        for _ in 0..100 {
            let max = Duration::from_secs(1);
            let d = JitterPolicy::Decorrelated.apply_decorrelated(base, prev, max);
            assert!(d >= base && d <= Duration::from_millis(120));
        }
    }
}
