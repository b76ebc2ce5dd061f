//! # Subscription: the consumer end of one bounded queue.
//!
//! A [`Subscription`] is returned by [`Broker::subscribe`](crate::Broker::subscribe).
//! It yields events in queue order and reports end-of-stream (`None`) once the
//! broker has shut down and the buffered events are consumed.
//!
//! ## Example
//! ```rust
//! use evbroker::{Broker, Event};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let broker = Broker::default();
//! let mut sub = broker.subscribe("user.created").await;
//!
//! broker.publish(Event::new("user.created", "accounts").with_id("e1")).await;
//! let ev = sub.recv().await.unwrap();
//! assert_eq!(ev.id(), "e1");
//!
//! broker.shutdown().await;
//! assert!(sub.recv().await.is_none());
//! # }
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::events::{Event, Topic};

pub use tokio::sync::mpsc::error::TryRecvError;

/// Receiving half of a subscription queue.
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    rx: mpsc::Receiver<Arc<Event>>,
}

impl Subscription {
    /// Creates an open queue and returns the sender to register.
    pub(crate) fn open(topic: Topic, capacity: usize) -> (Self, mpsc::Sender<Arc<Event>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { topic, rx }, tx)
    }

    /// Creates a queue that is already at end-of-stream.
    pub(crate) fn closed(topic: Topic) -> Self {
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        Self { topic, rx }
    }

    /// Receives the next event, or `None` once the queue is closed and empty.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        self.rx.recv().await
    }

    /// Receives an already-buffered event without waiting.
    pub fn try_recv(&mut self) -> Result<Arc<Event>, TryRecvError> {
        self.rx.try_recv()
    }

    /// True once the broker has closed this queue.
    ///
    /// Buffered events may still be pending; `recv` drains them before returning `None`.
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Subscription key this queue was registered under.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }
}

impl Stream for Subscription {
    type Item = Arc<Event>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
