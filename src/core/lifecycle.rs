//! # Lifecycle guard: shutdown state and pending-delivery accounting.
//!
//! ```text
//!   Open ──shutdown()──► Draining ──(pending == 0, queues closed)──► Closed
//! ```
//!
//! ## Rules
//! - The state only moves forward; `begin_shutdown` is idempotent.
//! - Deliveries are spawned through [`Lifecycle::spawn_delivery`], which counts them
//!   in a [`TaskTracker`]. Callers spawn only while holding the registry read lock
//!   and after observing `Open` under it.
//! - `drained()` closes the tracker and resolves once every counted delivery has
//!   finished. Queues must not be closed before that.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Observable broker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LifecycleState {
    /// Accepting subscriptions and publishes.
    Open = 0,
    /// Shutdown requested; waiting for in-flight deliveries.
    Draining = 1,
    /// All queues closed. Terminal.
    Closed = 2,
}

impl LifecycleState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => LifecycleState::Open,
            1 => LifecycleState::Draining,
            _ => LifecycleState::Closed,
        }
    }

    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Open => "open",
            LifecycleState::Draining => "draining",
            LifecycleState::Closed => "closed",
        }
    }
}

pub(crate) struct Lifecycle {
    state: AtomicU8,
    deliveries: TaskTracker,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Open as u8),
            deliveries: TaskTracker::new(),
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn is_shutting_down(&self) -> bool {
        self.state() != LifecycleState::Open
    }

    /// `Open → Draining`. Returns `true` only for the call that made the transition.
    pub(crate) fn begin_shutdown(&self) -> bool {
        self.state
            .compare_exchange(
                LifecycleState::Open as u8,
                LifecycleState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn mark_closed(&self) {
        self.state
            .fetch_max(LifecycleState::Closed as u8, Ordering::AcqRel);
    }

    /// Spawns a counted delivery task.
    pub(crate) fn spawn_delivery<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.deliveries.spawn(fut)
    }

    /// Number of deliveries still in flight.
    #[inline]
    pub(crate) fn pending(&self) -> usize {
        self.deliveries.len()
    }

    /// Closes the delivery tracker and waits until no delivery is in flight.
    pub(crate) async fn drained(&self) {
        self.deliveries.close();
        self.deliveries.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transitions_are_one_way() {
        let lc = Lifecycle::new();
        assert_eq!(lc.state(), LifecycleState::Open);
        assert!(!lc.is_shutting_down());

        assert!(lc.begin_shutdown());
        assert!(!lc.begin_shutdown());
        assert_eq!(lc.state(), LifecycleState::Draining);

        lc.mark_closed();
        assert!(!lc.begin_shutdown());
        assert_eq!(lc.state(), LifecycleState::Closed);
        assert!(lc.is_shutting_down());
    }

    #[tokio::test]
    async fn test_drained_waits_for_deliveries() {
        let lc = Lifecycle::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        lc.spawn_delivery(async move {
            let _ = rx.await;
        });
        assert_eq!(lc.pending(), 1);

        let early = tokio::time::timeout(Duration::from_millis(50), lc.drained()).await;
        assert!(early.is_err(), "drained resolved with a delivery in flight");

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), lc.drained())
            .await
            .expect("drained did not resolve after the delivery finished");
        assert_eq!(lc.pending(), 0);
    }
}
