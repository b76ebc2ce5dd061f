//! # LogWriter: event logger
//!
//! A minimal handler that logs every event it receives through `tracing`.
//! Subscribe it to [`WILDCARD`](crate::WILDCARD) to trace all broker traffic.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO evbroker::subscribers::log: event event_id="e1" event_type="user.created" source="accounts"
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;
use crate::subscribers::Handle;

/// Event logging handler.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handle for LogWriter {
    async fn on_event(&self, e: Arc<Event>) {
        tracing::info!(
            event_id = %e.id,
            event_type = %e.event_type,
            source = %e.source,
            content_type = e.data_content_type.as_deref().unwrap_or("-"),
            "event"
        );
    }

    fn name(&self) -> &str {
        "log-writer"
    }
}
