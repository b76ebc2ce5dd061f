//! Retry policies for outbound forwarders.
//!
//! ## Contents
//! - [`RetryPolicy`] how many times a failed forward is attempted
//! - [`BackoffPolicy`] how the delay between attempts grows (first / factor / max)
//! - [`JitterPolicy`] randomization that keeps forwarders from retrying in lockstep
//!
//! ## Quick wiring
//! ```text
//! Broker::forward(type, forwarder, RetryPolicy)
//!      └─► consumer loop per event:
//!           - retry.attempts() bounds the loop
//!           - retry.delay(n) = backoff.next(n) between attempts
//! ```
//!
//! ## Defaults
//! - `RetryPolicy { max_attempts: 3, .. }`
//! - `BackoffPolicy { first: 100ms, factor: 2.0, max: 5s, jitter: Equal }`

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
