//! Consumer loop shared by `subscribe_fn`, `subscribe_handler` and `forward`.

use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::core::subscription::Subscription;
use crate::subscribers::Handle;

/// Drives `handler` with every event from `sub` until the queue closes.
///
/// Panics inside the handler are caught per event and logged; the loop keeps going.
pub(crate) fn spawn_consumer(mut sub: Subscription, handler: Arc<dyn Handle>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = sub.recv().await {
            let event_id = Arc::clone(&ev.id);
            let fut = handler.on_event(ev);
            if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                tracing::error!(
                    handler = handler.name(),
                    event_id = %event_id,
                    panic = panic_message(panic.as_ref()),
                    "handler panicked"
                );
            }
        }
        tracing::debug!(handler = handler.name(), topic = %sub.topic(), "consumer loop finished");
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
