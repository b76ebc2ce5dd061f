//! # Broker: in-process fan-out with a draining shutdown.
//!
//! The [`Broker`] owns the subscription [`Registry`] behind a `RwLock` and the
//! [`Lifecycle`] guard. Cloning a broker is cheap and every clone refers to the
//! same instance.
//!
//! ## Publish path
//! ```text
//! publish(event)
//!   ├─ state != Open ─► dropped (no-op)
//!   └─ registry.read()
//!        ├─ state != Open (re-check under lock) ─► dropped
//!        └─ for queue in by_type[event.type] ++ wildcard:
//!             queue.dispatch(event) ─► TaskTracker::spawn(wait prev; tx.send(event))
//! ```
//!
//! ## Shutdown path
//! ```text
//! shutdown()
//!   ├─ Open ─► Draining (atomic, idempotent)
//!   ├─ registry.write() barrier: publishers that passed the check have finished spawning
//!   ├─ TaskTracker::close + wait: pending deliveries reach zero
//!   ├─ registry.write(): drop every sender ─► consumers observe end-of-stream
//!   └─ Draining ─► Closed
//! ```
//!
//! ## Known constraint
//! Deliveries have no timeout. A full queue whose consumer stopped reading keeps its
//! delivery task waiting, and `shutdown()` waits with it. Use
//! [`Broker::shutdown_timeout`] to bound the wait.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::core::config::BrokerConfig;
use crate::core::consumer::spawn_consumer;
use crate::core::lifecycle::{Lifecycle, LifecycleState};
use crate::core::registry::{Queue, Registry};
use crate::core::subscription::Subscription;
use crate::error::BrokerError;
use crate::events::{Event, Topic};
use crate::policies::RetryPolicy;
use crate::subscribers::{Forward, Forwarding, Handle, HandlerFn};

struct Inner {
    cfg: BrokerConfig,
    registry: RwLock<Registry>,
    lifecycle: Lifecycle,
}

/// In-process publish/subscribe hub.
///
/// All operations may be called concurrently from any task.
/// Operations that spawn (`publish`, `subscribe_fn`, ...) must run inside a tokio runtime.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<Inner>,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

impl Broker {
    /// Creates an open broker with the given configuration.
    pub fn new(cfg: BrokerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                registry: RwLock::new(Registry::new()),
                lifecycle: Lifecycle::new(),
            }),
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.inner.cfg
    }

    /// Registers a new queue for `event_type` ([`WILDCARD`](crate::WILDCARD) for every event).
    ///
    /// Each call returns an independent queue. Once shutdown has begun the returned
    /// queue is already closed and nothing is registered.
    pub async fn subscribe(&self, event_type: &str) -> Subscription {
        let topic = Topic::parse(event_type);
        if self.inner.lifecycle.is_shutting_down() {
            return Subscription::closed(topic);
        }

        let mut registry = self.inner.registry.write().await;
        if self.inner.lifecycle.is_shutting_down() {
            return Subscription::closed(topic);
        }

        let (sub, tx) = Subscription::open(topic.clone(), self.inner.cfg.queue_capacity_clamped());
        registry.insert(&topic, Queue::new(tx));
        tracing::debug!(topic = %topic, subscribers = registry.len(), "subscribed");
        sub
    }

    /// Fans `event` out to every queue subscribed to its type and to every wildcard queue.
    ///
    /// Returns once a delivery task has been spawned per matching queue; it never waits
    /// for consumers. After shutdown has begun the event is silently dropped.
    pub async fn publish(&self, event: Event) {
        if self.inner.lifecycle.is_shutting_down() {
            tracing::trace!(event_id = %event.id, "broker shutting down; event dropped");
            return;
        }

        let event = Arc::new(event);
        let registry = self.inner.registry.read().await;
        if self.inner.lifecycle.is_shutting_down() {
            tracing::trace!(event_id = %event.id, "broker shutting down; event dropped");
            return;
        }

        let mut fanout = 0usize;
        for queue in registry.matching(&event.event_type) {
            queue
                .dispatch(&self.inner.lifecycle, Arc::clone(&event))
                .await;
            fanout += 1;
        }
        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            fanout,
            "published"
        );
    }

    /// Calls `callback` once per event of `event_type` from a dedicated consumer task.
    ///
    /// The loop ends when the broker shuts down; `callback` is never called after that.
    pub async fn subscribe_fn<F>(&self, event_type: &str, callback: F)
    where
        F: Fn(Arc<Event>) + Send + Sync + 'static,
    {
        let name = format!("fn:{event_type}");
        self.subscribe_handler(event_type, HandlerFn::arc(name, callback))
            .await;
    }

    /// Drives `handler` with every event of `event_type` from a dedicated consumer task.
    pub async fn subscribe_handler(&self, event_type: &str, handler: Arc<dyn Handle>) {
        let sub = self.subscribe(event_type).await;
        spawn_consumer(sub, handler);
    }

    /// Hands every event of `event_type` to `forwarder`, retrying failures per `retry`.
    pub async fn forward(&self, event_type: &str, forwarder: Arc<dyn Forward>, retry: RetryPolicy) {
        tracing::debug!(forwarder = forwarder.name(), topic = event_type, "forwarding");
        self.subscribe_handler(event_type, Arc::new(Forwarding::new(forwarder, retry)))
            .await;
    }

    /// [`forward`](Self::forward) with the configured [`BrokerConfig::retry`].
    pub async fn forward_default(&self, event_type: &str, forwarder: Arc<dyn Forward>) {
        let retry = self.inner.cfg.retry;
        self.forward(event_type, forwarder, retry).await;
    }

    /// Stops intake, waits for in-flight deliveries, then closes every queue.
    ///
    /// Idempotent. Returns once the broker is [`LifecycleState::Closed`].
    pub async fn shutdown(&self) {
        self.begin_shutdown();
        self.drain().await;
        self.close_queues().await;
    }

    /// Like [`shutdown`](Self::shutdown), but gives up waiting for deliveries after `grace`.
    ///
    /// On timeout the queues stay open, the broker stays `Draining` and
    /// [`BrokerError::GraceExceeded`] is returned; call `shutdown()` to finish.
    pub async fn shutdown_timeout(&self, grace: Duration) -> Result<(), BrokerError> {
        self.begin_shutdown();
        if tokio::time::timeout(grace, self.drain()).await.is_err() {
            let pending = self.pending();
            tracing::warn!(grace = ?grace, pending, "shutdown grace exceeded");
            return Err(BrokerError::GraceExceeded { grace, pending });
        }
        self.close_queues().await;
        Ok(())
    }

    fn begin_shutdown(&self) {
        if self.inner.lifecycle.begin_shutdown() {
            tracing::info!(pending = self.pending(), "broker draining");
        }
    }

    async fn drain(&self) {
        // Publishers holding the read lock saw `Open` and are still spawning.
        drop(self.inner.registry.write().await);
        self.inner.lifecycle.drained().await;
    }

    async fn close_queues(&self) {
        let closed = self.inner.registry.write().await.close_all();
        let was_closed = self.state() == LifecycleState::Closed;
        self.inner.lifecycle.mark_closed();
        if !was_closed {
            tracing::info!(queues = closed, "broker closed");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.inner.lifecycle.state()
    }

    /// True once shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.inner.lifecycle.is_shutting_down()
    }

    /// Deliveries spawned but not yet enqueued.
    pub fn pending(&self) -> usize {
        self.inner.lifecycle.pending()
    }

    /// Registered queues, type-keyed and wildcard.
    pub async fn subscriber_count(&self) -> usize {
        self.inner.registry.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_secs(1);

    async fn recv_within(sub: &mut Subscription) -> Arc<Event> {
        tokio::time::timeout(WAIT, sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("queue closed unexpectedly")
    }

    #[tokio::test]
    async fn test_subscribe_registers_distinct_queues() {
        let broker = Broker::default();
        let _a = broker.subscribe("a").await;
        let _b = broker.subscribe("a").await;
        let _w = broker.subscribe("*").await;
        assert_eq!(broker.subscriber_count().await, 3);
    }

    #[tokio::test]
    async fn test_publish_counts_pending_until_enqueued() {
        let broker = Broker::new(BrokerConfig {
            queue_capacity: 1,
            ..BrokerConfig::default()
        });
        let mut sub = broker.subscribe("a").await;

        broker.publish(Event::new("a", "test").with_id("1")).await;
        broker.publish(Event::new("a", "test").with_id("2")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(broker.pending(), 1, "second delivery should wait for space");

        assert_eq!(recv_within(&mut sub).await.id(), "1");
        assert_eq!(recv_within(&mut sub).await.id(), "2");
        broker.shutdown().await;
        assert_eq!(broker.pending(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_timeout_reports_stalled_delivery() {
        let broker = Broker::new(BrokerConfig {
            queue_capacity: 1,
            ..BrokerConfig::default()
        });
        let mut stalled = broker.subscribe("a").await;

        broker.publish(Event::new("a", "test").with_id("1")).await;
        broker.publish(Event::new("a", "test").with_id("2")).await;

        let err = broker
            .shutdown_timeout(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::GraceExceeded { pending: 1, .. }));
        assert_eq!(broker.state(), LifecycleState::Draining);

        assert_eq!(recv_within(&mut stalled).await.id(), "1");
        assert_eq!(recv_within(&mut stalled).await.id(), "2");
        broker.shutdown().await;
        assert_eq!(broker.state(), LifecycleState::Closed);
        assert!(stalled.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_callback_panic_does_not_stop_loop() {
        let broker = Broker::default();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        broker
            .subscribe_fn("a", move |ev| {
                if ev.id() == "boom" {
                    panic!("callback failure");
                }
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        broker.publish(Event::new("a", "test").with_id("boom")).await;
        broker.publish(Event::new("a", "test").with_id("ok")).await;

        tokio::time::timeout(WAIT, async {
            while seen.load(Ordering::SeqCst) < 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("callback never ran after the panic");
        broker.shutdown().await;
    }

    #[tokio::test]
    async fn test_dropped_subscription_does_not_block_others() {
        let broker = Broker::new(BrokerConfig {
            queue_capacity: 1,
            ..BrokerConfig::default()
        });
        drop(broker.subscribe("a").await);
        let mut live = broker.subscribe("a").await;

        for i in 0..3 {
            broker.publish(Event::new("a", "test").with_id(i.to_string())).await;
        }
        for i in 0..3 {
            assert_eq!(recv_within(&mut live).await.id(), i.to_string());
        }
        tokio::time::timeout(WAIT, broker.shutdown())
            .await
            .expect("shutdown stalled on an abandoned queue");
    }
}
