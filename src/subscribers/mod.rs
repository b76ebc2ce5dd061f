//! # Consumers built on top of subscriptions.
//!
//! Everything here runs inside a broker consumer loop: one bounded queue and one
//! task per registration.
//!
//! ```text
//! Broker::publish ──► [queue] ──► consumer task ──┬─► Handle::on_event   (subscribe_handler / subscribe_fn)
//!                                                 └─► Forward::send      (forward, with RetryPolicy)
//! ```
//!
//! ## Contents
//! - [`Handle`], [`HandlerFn`] in-process callbacks
//! - [`Forward`], [`ForwardFn`] outbound forwarders to external transports
//! - `LogWriter` (feature `logging`) traces every event it sees

mod forward;
mod handler;
#[cfg(feature = "logging")]
mod log;

pub(crate) use forward::Forwarding;
pub use forward::{Forward, ForwardFn};
pub use handler::{Handle, HandlerFn};
#[cfg(feature = "logging")]
pub use log::LogWriter;
