//! Stream subscriptions: per-type payloads and the subscribe-all firehose.
//!
//! Run with: `cargo run --example streams`

use typebus::{BusConfig, EventBus, LoadingChanged, LoadingTracker};

#[derive(Debug)]
struct CartUpdated {
    total: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let bus = EventBus::new(BusConfig::default());

    let mut carts = bus.on::<CartUpdated>("cart:updated");
    let mut firehose = bus.all();

    bus.publish("cart:updated", CartUpdated { total: 10 });
    bus.publish("cart:updated", CartUpdated { total: 25 });
    bus.publish("user:logout", ());

    while let Ok(update) = carts.try_recv() {
        println!("cart total is now {}", update.total);
    }

    // The firehose sees every event, whatever the type.
    while let Ok(ev) = firehose.try_recv() {
        println!("observed [{}] seq={}", ev.event_type, ev.seq);
    }

    // Loading transitions ride the same bus.
    let loading = LoadingTracker::new(bus.clone());
    let mut changes = bus.on::<LoadingChanged>(LoadingChanged::EVENT_TYPE);
    {
        let _guard = loading.start("checkout");
        let change = changes.recv().await.unwrap();
        println!("loading[{}] active={}", change.scope, change.active);
    }
    let change = changes.recv().await.unwrap();
    println!("loading[{}] active={}", change.scope, change.active);

    bus.close();
}
