//! # Heartbeat: periodic self-publish through the broker.
//!
//! The heartbeat subscribes a logging callback to a randomised `heartbeat:<n>`
//! topic, then publishes one event to that topic per interval. A beat showing up
//! in the logs proves the publish → deliver → consume path is alive.
//!
//! Wildcard subscribers see the beats too. The loop stops on its own once the
//! broker starts shutting down.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::broker::Broker;
use crate::events::Event;

/// Source attribute of heartbeat events.
pub const HEARTBEAT_SOURCE: &str = "evbroker/heartbeat";

/// Prefix of the per-broker heartbeat topic.
pub const HEARTBEAT_PREFIX: &str = "heartbeat:";

impl Broker {
    /// Starts the heartbeat if `BrokerConfig::heartbeat_interval` is non-zero.
    pub fn spawn_heartbeat(&self) -> Option<JoinHandle<()>> {
        let interval = self.config().heartbeat()?;
        Some(self.spawn_heartbeat_every(interval))
    }

    /// Starts a heartbeat with an explicit period.
    pub fn spawn_heartbeat_every(&self, interval: Duration) -> JoinHandle<()> {
        let broker = self.clone();
        tokio::spawn(async move { run(broker, interval).await })
    }
}

async fn run(broker: Broker, interval: Duration) {
    let topic = format!("{HEARTBEAT_PREFIX}{}", rand::random::<u32>());

    let logged = topic.clone();
    broker
        .subscribe_fn(&topic, move |ev| {
            tracing::info!(topic = %logged, event_id = %ev.id, at = ?ev.time, "heartbeat");
        })
        .await;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; beats start one interval in.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if broker.is_shutting_down() {
            break;
        }
        broker
            .publish(Event::new(topic.as_str(), HEARTBEAT_SOURCE))
            .await;
    }
    tracing::debug!(topic = %topic, "heartbeat stopped");
}
