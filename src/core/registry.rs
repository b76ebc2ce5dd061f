//! # Subscription registry: event type → delivery queues.
//!
//! ```text
//! Registry
//!   ├─ by_type:  "user.created" ─► [Queue, Queue]
//!   │            "order.created" ─► [Queue]
//!   └─ wildcard: [Queue]           (receives every event)
//! ```
//!
//! ## Rules
//! - The registry lives behind the broker's `RwLock`: `publish` reads, `subscribe`
//!   and `shutdown` write.
//! - Each [`Queue`] keeps the handle of its most recent delivery task. A new
//!   delivery awaits that handle before sending, so deliveries to one queue are
//!   enqueued in the order they were dispatched.
//! - Queues whose consumer dropped its [`Subscription`](super::Subscription) are
//!   skipped by `matching`, not counted by `len`, and swept from every list (empty
//!   type entries included) on the next registration.
//! - `close_all` drops every sender; consumers then see end-of-stream once their
//!   buffers drain.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::core::lifecycle::Lifecycle;
use crate::events::{Event, Topic};

/// Sending half of one subscription plus its delivery chain.
pub(crate) struct Queue {
    tx: mpsc::Sender<Arc<Event>>,
    tail: Mutex<Option<JoinHandle<()>>>,
}

impl Queue {
    pub(crate) fn new(tx: mpsc::Sender<Arc<Event>>) -> Arc<Self> {
        Arc::new(Self {
            tx,
            tail: Mutex::new(None),
        })
    }

    /// Spawns a counted delivery of `event` into this queue.
    ///
    /// The task waits for the previous delivery on this queue, then for queue space.
    /// A consumer that went away turns the send into a no-op.
    pub(crate) async fn dispatch(&self, lifecycle: &Lifecycle, event: Arc<Event>) {
        let mut tail = self.tail.lock().await;
        let prev = tail.take();
        let tx = self.tx.clone();

        let handle = lifecycle.spawn_delivery(async move {
            if let Some(prev) = prev {
                let _ = prev.await;
            }
            if tx.send(event).await.is_err() {
                tracing::trace!("subscriber dropped its queue; event discarded");
            }
        });
        *tail = Some(handle);
    }

    #[inline]
    fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Fan-out table guarded by the broker lock.
#[derive(Default)]
pub(crate) struct Registry {
    by_type: HashMap<Arc<str>, Vec<Arc<Queue>>>,
    wildcard: Vec<Arc<Queue>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a queue under `topic` after sweeping abandoned queues.
    pub(crate) fn insert(&mut self, topic: &Topic, queue: Arc<Queue>) {
        self.prune();
        match topic {
            Topic::Any => self.wildcard.push(queue),
            Topic::Exact(ty) => self.by_type.entry(Arc::clone(ty)).or_default().push(queue),
        }
    }

    /// Drops abandoned queues and the type entries they leave empty.
    fn prune(&mut self) {
        self.by_type.retain(|_, list| {
            list.retain(|q| !q.is_abandoned());
            !list.is_empty()
        });
        self.wildcard.retain(|q| !q.is_abandoned());
    }

    /// Live queues that should receive an event of `event_type`: exact matches first,
    /// then wildcards.
    pub(crate) fn matching<'a>(
        &'a self,
        event_type: &str,
    ) -> impl Iterator<Item = &'a Arc<Queue>> + 'a {
        self.by_type
            .get(event_type)
            .into_iter()
            .flatten()
            .chain(self.wildcard.iter())
            .filter(|q| !q.is_abandoned())
    }

    /// Live queues (type-keyed and wildcard).
    pub(crate) fn len(&self) -> usize {
        self.by_type
            .values()
            .flatten()
            .chain(self.wildcard.iter())
            .filter(|q| !q.is_abandoned())
            .count()
    }

    /// Drops every queue, closing them. Returns how many live queues were closed.
    pub(crate) fn close_all(&mut self) -> usize {
        let closed = self.len();
        self.by_type.clear();
        self.wildcard.clear();
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subscription::Subscription;

    fn queue(topic: &Topic) -> (Subscription, Arc<Queue>) {
        let (sub, tx) = Subscription::open(topic.clone(), 4);
        (sub, Queue::new(tx))
    }

    #[test]
    fn test_matching_includes_exact_and_wildcard_only() {
        let mut reg = Registry::new();
        let a = Topic::parse("a");
        let b = Topic::parse("b");
        let (_sa, qa) = queue(&a);
        let (_sb, qb) = queue(&b);
        let (_sw, qw) = queue(&Topic::Any);
        reg.insert(&a, Arc::clone(&qa));
        reg.insert(&b, Arc::clone(&qb));
        reg.insert(&Topic::Any, Arc::clone(&qw));

        let hits: Vec<_> = reg.matching("a").collect();
        assert_eq!(hits.len(), 2);
        assert!(Arc::ptr_eq(hits[0], &qa));
        assert!(Arc::ptr_eq(hits[1], &qw));

        let none_typed: Vec<_> = reg.matching("c").collect();
        assert_eq!(none_typed.len(), 1);
        assert!(Arc::ptr_eq(none_typed[0], &qw));
    }

    #[test]
    fn test_abandoned_queues_pruned_on_insert() {
        let mut reg = Registry::new();
        let a = Topic::parse("a");
        let (dropped, q1) = queue(&a);
        reg.insert(&a, q1);
        drop(dropped);

        let (_kept, q2) = queue(&a);
        reg.insert(&a, q2);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_insert_sweeps_other_types_and_empty_entries() {
        let mut reg = Registry::new();
        let mut dropped = Vec::new();
        for i in 0..50 {
            let topic = Topic::parse(&format!("t{i}"));
            let (sub, q) = queue(&topic);
            reg.insert(&topic, q);
            dropped.push(sub);
        }
        let (gone_wild, qw) = queue(&Topic::Any);
        reg.insert(&Topic::Any, qw);
        assert_eq!(reg.len(), 51);

        drop(dropped);
        drop(gone_wild);
        assert_eq!(reg.len(), 0, "abandoned queues are not counted");
        assert_eq!(reg.matching("t3").count(), 0);

        let keep = Topic::parse("keep");
        let (_live, q) = queue(&keep);
        reg.insert(&keep, q);
        assert_eq!(reg.by_type.len(), 1);
        assert!(reg.wildcard.is_empty());
        assert_eq!(reg.len(), 1);
    }

    #[tokio::test]
    async fn test_close_all_ends_streams() {
        let mut reg = Registry::new();
        let a = Topic::parse("a");
        let (mut sa, qa) = queue(&a);
        let (mut sw, qw) = queue(&Topic::Any);
        reg.insert(&a, qa);
        reg.insert(&Topic::Any, qw);

        assert_eq!(reg.close_all(), 2);
        assert_eq!(reg.len(), 0);
        assert!(sa.recv().await.is_none());
        assert!(sw.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_preserves_order_on_full_queue() {
        let lifecycle = Lifecycle::new();
        let (mut sub, tx) = Subscription::open(Topic::parse("a"), 1);
        let q = Queue::new(tx);

        for i in 0..5 {
            let ev = Arc::new(Event::new("a", "test").with_id(i.to_string()));
            q.dispatch(&lifecycle, ev).await;
        }

        for i in 0..5 {
            let ev = sub.recv().await.unwrap();
            assert_eq!(ev.id(), i.to_string());
        }
    }
}
