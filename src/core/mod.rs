//! Broker core: registry, delivery and lifecycle.
//!
//! The only public entry point is [`Broker`]; the rest are its parts.
//!
//! Internal modules:
//! - [`broker`]: publish/subscribe/shutdown and the callback adapters;
//! - [`registry`]: event type → queues map, wildcard list, per-queue delivery chain;
//! - [`lifecycle`]: `Open → Draining → Closed` state and pending-delivery tracker;
//! - [`subscription`]: consumer end of a queue;
//! - [`consumer`]: the loop behind callback, handler and forwarder subscriptions;
//! - [`heartbeat`]: optional periodic self-publish;
//! - [`config`]: [`BrokerConfig`].
//!
//! ## Wiring
//! ```text
//!  publisher ──► Broker::publish ──► Registry (read lock) ──► Queue::dispatch ──► TaskTracker task
//!                                                                                   │ tx.send
//!                                                                                   ▼
//!  subscriber ◄── Subscription::recv ◄──────────────────────────────────────── [bounded mpsc]
//!                       │
//!                       └─► consumer loop ─► Handle::on_event / Forward::send
//! ```

mod broker;
mod config;
mod consumer;
mod heartbeat;
mod lifecycle;
mod registry;
mod subscription;

pub use broker::Broker;
pub use config::{BrokerConfig, DEFAULT_QUEUE_CAPACITY};
pub use heartbeat::{HEARTBEAT_PREFIX, HEARTBEAT_SOURCE};
pub use lifecycle::LifecycleState;
pub use subscription::{Subscription, TryRecvError};
