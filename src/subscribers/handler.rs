//! # Event handlers driven by a consumer loop.
//!
//! [`Handle`] is the extension point behind
//! [`Broker::subscribe_handler`](crate::Broker::subscribe_handler). Each registered
//! handler gets:
//! - its own bounded queue (capacity from `BrokerConfig::queue_capacity`);
//! - a dedicated consumer task that calls [`Handle::on_event`] once per event, in queue order;
//! - panic isolation (a panic is logged and the loop moves on to the next event).
//!
//! ```text
//! publish ──► [queue] ──► consumer task ──► handler.on_event(event)
//!                                        └─► panic caught → tracing::error!
//! ```
//!
//! [`HandlerFn`] adapts a plain closure; it is what
//! [`Broker::subscribe_fn`](crate::Broker::subscribe_fn) uses.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use evbroker::{Event, Handle};
//!
//! struct Counter(AtomicU64);
//!
//! #[async_trait]
//! impl Handle for Counter {
//!     async fn on_event(&self, _event: Arc<Event>) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &str { "counter" }
//! }
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;

/// Consumer of one subscription's events.
///
/// ### Implementation requirements
/// - Handle errors internally; the broker does not observe them.
/// - A slow handler only backs up its own queue.
#[async_trait]
pub trait Handle: Send + Sync + 'static {
    /// Processes a single event. Called sequentially from the consumer task.
    async fn on_event(&self, event: Arc<Event>);

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed handler.
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F>
where
    F: Fn(Arc<Event>) + Send + Sync + 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler as a shared `Arc<dyn Handle>`-ready value.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> Handle for HandlerFn<F>
where
    F: Fn(Arc<Event>) + Send + Sync + 'static,
{
    async fn on_event(&self, event: Arc<Event>) {
        (self.f)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}
