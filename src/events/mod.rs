//! Event data model and subscription keys.
//!
//! ## Contents
//! - [`Event`] the immutable record routed by the broker
//! - [`Topic`], [`WILDCARD`] exact-type and wildcard subscription keys
//!
//! The broker routes on `Event::event_type` only. See `core/mod.rs` for the
//! publish/deliver wiring.

mod event;
mod topic;

pub use event::Event;
pub use topic::{Topic, WILDCARD};
