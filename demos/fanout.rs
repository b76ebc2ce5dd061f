//! # Fan-out Example
//!
//! Shows exact-type, wildcard, callback and forwarder subscriptions on one broker,
//! then a draining shutdown.
//!
//! - `order.created` has two independent queue subscribers;
//! - a `LogWriter` traces every event through `*`;
//! - a flaky forwarder republishes `order.created` "outside" with retries;
//! - a heartbeat runs in the background.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example fanout --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use evbroker::{Broker, BrokerConfig, BrokerError, Event, ForwardFn, LogWriter, WILDCARD};
use tracing_subscriber::EnvFilter;

#[derive(serde::Serialize)]
struct Order {
    id: u32,
    total_cents: u64,
}

#[tokio::main]
async fn main() -> Result<(), BrokerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let broker = Broker::new(BrokerConfig {
        queue_capacity: 16,
        heartbeat_interval: Duration::from_millis(200),
        ..BrokerConfig::default()
    });
    let heartbeat = broker.spawn_heartbeat();

    broker.subscribe_handler(WILDCARD, Arc::new(LogWriter::new())).await;

    let calls = Arc::new(AtomicU32::new(0));
    let flaky = ForwardFn::arc("outbound", {
        let calls = Arc::clone(&calls);
        move |ev: Event| {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
                    return Err(BrokerError::Forward {
                        error: "upstream unavailable".into(),
                    });
                }
                println!("forwarded {} ({})", ev.id(), ev.event_type());
                Ok(())
            }
        }
    });
    broker.forward_default("order.created", flaky).await;

    let mut audit = broker.subscribe("order.created").await;
    let mut billing = broker.subscribe("order.created").await;

    let readers = tokio::spawn(async move {
        let mut n = 0;
        while let (Some(a), Some(b)) = (audit.recv().await, billing.recv().await) {
            println!("audit={} billing={}", a.id(), b.id());
            n += 1;
        }
        n
    });

    for id in 1..=3 {
        let ev = Event::new("order.created", "shop").with_data(
            "application/json",
            &Order {
                id,
                total_cents: 1_000 * u64::from(id),
            },
        )?;
        broker.publish(ev).await;
    }
    broker.publish(Event::new("user.created", "accounts")).await;

    tokio::time::sleep(Duration::from_millis(600)).await;
    broker.shutdown().await;

    let received = readers.await.unwrap_or_default();
    println!("readers saw {received} orders; state={}", broker.state().as_str());
    if let Some(h) = heartbeat {
        let _ = h.await;
    }
    Ok(())
}
