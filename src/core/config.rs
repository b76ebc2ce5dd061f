//! # Broker configuration.
//!
//! Provides [`BrokerConfig`] centralized settings for a [`Broker`](crate::Broker).
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1
//! - `heartbeat_interval = 0s` → no heartbeat

use std::time::Duration;

use crate::policies::RetryPolicy;

/// Default number of pending events buffered per subscription.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Settings for a broker instance.
///
/// ## Field semantics
/// - `queue_capacity`: bounded queue size per subscription. A delivery to a full
///   queue waits for space, so this is the backpressure knob.
/// - `heartbeat_interval`: period of the self-publish loop started by
///   [`Broker::spawn_heartbeat`](crate::Broker::spawn_heartbeat) (`0s` = disabled).
/// - `retry`: retry policy used by [`Broker::forward_default`](crate::Broker::forward_default).
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    /// Pending events buffered per subscription before deliveries start waiting.
    pub queue_capacity: usize,

    /// Heartbeat period.
    ///
    /// - `Duration::ZERO` = no heartbeat
    /// - `> 0` = one self-addressed event per period
    pub heartbeat_interval: Duration,

    /// Default retry policy for outbound forwarders.
    pub retry: RetryPolicy,
}

impl BrokerConfig {
    /// Returns the per-subscription capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the heartbeat period as an `Option`.
    ///
    /// - `None` → heartbeat disabled
    /// - `Some(d)` → one beat every `d`
    #[inline]
    pub fn heartbeat(&self) -> Option<Duration> {
        if self.heartbeat_interval == Duration::ZERO {
            None
        } else {
            Some(self.heartbeat_interval)
        }
    }
}

impl Default for BrokerConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 10`
    /// - `heartbeat_interval = 0s` (disabled)
    /// - `retry = RetryPolicy::default()` (3 attempts, exponential backoff)
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            heartbeat_interval: Duration::ZERO,
            retry: RetryPolicy::default(),
        }
    }
}
