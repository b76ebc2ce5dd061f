//! Error types used by the broker and its collaborators.
//!
//! The broker's own operations (`publish`, `subscribe`, `shutdown`) never fail:
//! post-shutdown calls are defined no-ops and contention is resolved by locking.
//! [`BrokerError`] covers the edges around that core:
//!
//! - bounded shutdown ([`Broker::shutdown_timeout`](crate::Broker::shutdown_timeout));
//! - payload encoding/decoding on [`Event`](crate::Event);
//! - failures reported by outbound forwarders.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced around the broker core.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Deliveries were still in flight when the shutdown grace period ran out.
    ///
    /// Queues are left open and the broker stays in `Draining`;
    /// a later `shutdown()` completes the transition.
    #[error("shutdown grace {grace:?} exceeded; {pending} deliveries still pending")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Deliveries still in flight when the grace expired.
        pending: usize,
    },

    /// Event payload could not be serialized.
    #[error("failed to encode event data: {error}")]
    Encode {
        /// The underlying serializer message.
        error: String,
    },

    /// Event payload is missing or does not match the requested type.
    #[error("failed to decode event data: {error}")]
    Decode {
        /// The underlying deserializer message.
        error: String,
    },

    /// An outbound forwarder failed to hand the event to its transport.
    #[error("forward failed: {error}")]
    Forward {
        /// Transport-specific failure message.
        error: String,
    },
}

impl BrokerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use evbroker::BrokerError;
    /// use std::time::Duration;
    ///
    /// let err = BrokerError::GraceExceeded { grace: Duration::from_secs(5), pending: 2 };
    /// assert_eq!(err.as_label(), "broker_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BrokerError::GraceExceeded { .. } => "broker_grace_exceeded",
            BrokerError::Encode { .. } => "event_encode",
            BrokerError::Decode { .. } => "event_decode",
            BrokerError::Forward { .. } => "forward_failed",
        }
    }

    /// Indicates whether a forwarder may retry after this error.
    ///
    /// Only [`BrokerError::Forward`] is retryable; codec errors fail the same way every time.
    ///
    /// # Example
    /// ```
    /// use evbroker::BrokerError;
    ///
    /// assert!(BrokerError::Forward { error: "unavailable".into() }.is_retryable());
    /// assert!(!BrokerError::Encode { error: "bad".into() }.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, BrokerError::Forward { .. })
    }
}
