//! # Outbound forwarders.
//!
//! A [`Forward`] hands events to something outside the process: a cloud
//! messaging topic, a webhook, a durable bus. The broker wires it through a
//! consumer loop ([`Broker::forward`](crate::Broker::forward)); the forwarder
//! owns its transport and must not block forever.
//!
//! ## Failure handling
//! - `Err(BrokerError::Forward { .. })` is retried per [`RetryPolicy`] with backoff.
//! - Any other error, or the last failed attempt, is logged and the event is dropped.
//! - Publishers never see forwarder failures.
//!
//! ## Example
//! ```rust
//! use evbroker::{BrokerError, Event, ForwardFn};
//!
//! let forwarder = ForwardFn::arc("pubsub", |event: Event| async move {
//!     let _body = serde_json::to_vec(&event).map_err(|e| BrokerError::Encode {
//!         error: e.to_string(),
//!     })?;
//!     // client.send(topic, body).await ...
//!     Ok::<(), BrokerError>(())
//! });
//! # let _ = forwarder;
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BrokerError;
use crate::events::Event;
use crate::policies::RetryPolicy;
use crate::subscribers::Handle;

/// Hands an event to an external transport.
#[async_trait]
pub trait Forward: Send + Sync + 'static {
    /// Sends one event. Return [`BrokerError::Forward`] for failures worth retrying.
    async fn send(&self, event: &Event) -> Result<(), BrokerError>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed forwarder.
///
/// The closure receives its own copy of the event, so it may move it into the transport.
pub struct ForwardFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ForwardFn<F> {
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Forward for ForwardFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BrokerError>> + Send + 'static,
{
    async fn send(&self, event: &Event) -> Result<(), BrokerError> {
        (self.f)(event.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Adapts a [`Forward`] into a [`Handle`] with retries.
pub(crate) struct Forwarding {
    forward: Arc<dyn Forward>,
    retry: RetryPolicy,
}

impl Forwarding {
    pub(crate) fn new(forward: Arc<dyn Forward>, retry: RetryPolicy) -> Self {
        Self { forward, retry }
    }
}

#[async_trait]
impl Handle for Forwarding {
    async fn on_event(&self, event: Arc<Event>) {
        let attempts = self.retry.attempts();

        for attempt in 0..attempts {
            let err = match self.forward.send(&event).await {
                Ok(()) => {
                    tracing::trace!(
                        forwarder = self.forward.name(),
                        event_id = %event.id,
                        attempt = attempt + 1,
                        "event forwarded"
                    );
                    return;
                }
                Err(err) => err,
            };

            if attempt + 1 >= attempts || !err.is_retryable() {
                tracing::error!(
                    forwarder = self.forward.name(),
                    event_id = %event.id,
                    event_type = %event.event_type,
                    attempts = attempt + 1,
                    label = err.as_label(),
                    error = %err,
                    "failed to forward event"
                );
                return;
            }

            let delay = self.retry.delay(attempt);
            tracing::warn!(
                forwarder = self.forward.name(),
                event_id = %event.id,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "forward failed; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn name(&self) -> &str {
        self.forward.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::{BackoffPolicy, JitterPolicy};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: BackoffPolicy {
                first: Duration::from_millis(1),
                max: Duration::from_millis(5),
                factor: 2.0,
                jitter: JitterPolicy::None,
            },
        }
    }

    fn flaky(fail_first: u32, calls: Arc<AtomicU32>) -> Arc<dyn Forward> {
        ForwardFn::arc("flaky", move |_event: Event| {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < fail_first {
                    Err(BrokerError::Forward {
                        error: format!("unavailable #{n}"),
                    })
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let fwd = Forwarding::new(flaky(2, Arc::clone(&calls)), fast_retry(5));

        fwd.on_event(Arc::new(Event::new("a", "test"))).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let fwd = Forwarding::new(flaky(u32::MAX, Arc::clone(&calls)), fast_retry(3));

        fwd.on_event(Arc::new(Event::new("a", "test"))).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let forward = ForwardFn::arc("encoder", move |_event: Event| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(BrokerError::Encode {
                    error: "unsupported payload".into(),
                })
            }
        });
        let fwd = Forwarding::new(forward, fast_retry(5));

        fwd.on_event(Arc::new(Event::new("a", "test"))).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_forward_fn_receives_event_copy() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let forward = ForwardFn::new("sink", move |event: Event| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(event);
                Ok::<(), BrokerError>(())
            }
        });

        let ev = Event::new("test.event", "test").with_json(serde_json::json!("test-data"));
        forward.send(&ev).await.unwrap();

        let got = seen.lock().unwrap();
        assert_eq!(got.as_slice(), &[ev]);
        assert_eq!(forward.name(), "sink");
    }
}
