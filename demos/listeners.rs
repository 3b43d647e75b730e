//! Background listeners with panic isolation.
//!
//! Run with: `cargo run --example listeners --features logging`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use typebus::{BusConfig, BusEvent, EventBus, Listen, ListenerSet, LogWriter};

/// Counts events per run; a stand-in for a real metrics sink.
#[derive(Default)]
struct Metrics {
    seen: AtomicU64,
}

#[async_trait]
impl Listen for Metrics {
    async fn on_event(&self, _event: &BusEvent) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }
    fn name(&self) -> &'static str {
        "metrics"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let bus = EventBus::new(BusConfig::default());

    let metrics = Arc::new(Metrics::default());
    let set = ListenerSet::spawn(
        &bus,
        vec![Arc::new(LogWriter), Arc::clone(&metrics) as Arc<dyn Listen>],
    );

    bus.publish("job:started", ());
    bus.publish("job:finished", ());

    // Let the workers drain, then stop them.
    tokio::task::yield_now().await;
    set.shutdown().await;

    println!("metrics listener saw {} events", metrics.seen.load(Ordering::Relaxed));
    bus.close();
}
