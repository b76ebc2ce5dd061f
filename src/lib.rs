//! # evbroker
//!
//! **evbroker** is an in-process publish/subscribe broker for typed events.
//!
//! It routes each published [`Event`] to every subscription for its type and to
//! every wildcard subscription, using one bounded queue per subscriber. It shuts
//! down by draining in-flight deliveries before closing queues, so no event is
//! written after close and no new work is accepted once shutdown begins.
//! There is no network transport and no persistence.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   publisher A        publisher B        inbound adapter
//!        │                  │                   │
//!        └──────────────────┼───────────────────┘
//!                           ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Broker                                                           │
//! │  - Registry  (RwLock: type → [Queue], wildcard → [Queue])         │
//! │  - Lifecycle (Open → Draining → Closed + pending TaskTracker)     │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        │ one task per     │                  │
//!        │ (event, queue)   │                  │
//!        ▼                  ▼                  ▼
//!   [queue "a"]        [queue "a"]        [queue "*"]     (bounded, FIFO)
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//!   Subscription     consumer loop       consumer loop
//!   .recv()          └─► callback        └─► Forward::send (retry/backoff)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Open
//!   ├─ subscribe(type)  ─► new queue
//!   ├─ publish(event)   ─► fan-out
//!   └─ shutdown()
//!        ▼
//! Draining   publish = no-op, subscribe = closed queue
//!   ├─ wait for pending deliveries (no timeout; see shutdown_timeout)
//!   └─ close every queue
//!        ▼
//! Closed     consumers observe end-of-stream
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                      |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------|
//! | **Broker**        | Publish, subscribe, wildcard fan-out, draining shutdown.      | [`Broker`], [`Subscription`]            |
//! | **Events**        | Immutable typed records with an optional JSON payload.        | [`Event`], [`Topic`]                    |
//! | **Callbacks**     | Consumer loops driving closures or trait objects.             | [`Handle`], [`HandlerFn`]               |
//! | **Forwarding**    | Hand events to external transports with retries.              | [`Forward`], [`ForwardFn`], [`RetryPolicy`] |
//! | **Errors**        | Typed errors for the edges around the core.                   | [`BrokerError`]                         |
//! | **Configuration** | Queue capacity, heartbeat, default retry.                     | [`BrokerConfig`]                        |
//!
//! ## Optional features
//! - `logging`: exports the built-in `LogWriter` handler.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use evbroker::{Broker, BrokerConfig, Event};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let broker = Broker::new(BrokerConfig::default());
//!
//!     let mut created = broker.subscribe("user.created").await;
//!     let mut everything = broker.subscribe("*").await;
//!     broker
//!         .subscribe_fn("user.created", |ev: Arc<Event>| println!("welcome {}", ev.id()))
//!         .await;
//!
//!     broker.publish(Event::new("user.created", "accounts").with_id("e1")).await;
//!
//!     assert_eq!(created.recv().await.unwrap().id(), "e1");
//!     assert_eq!(everything.recv().await.unwrap().id(), "e1");
//!
//!     broker.shutdown().await;
//!     assert!(created.recv().await.is_none());
//! }
//! ```

mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    Broker, BrokerConfig, DEFAULT_QUEUE_CAPACITY, HEARTBEAT_PREFIX, HEARTBEAT_SOURCE,
    LifecycleState, Subscription, TryRecvError,
};
pub use error::BrokerError;
pub use events::{Event, Topic, WILDCARD};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use subscribers::{Forward, ForwardFn, Handle, HandlerFn};

// Optional: expose a simple built-in logging handler.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
