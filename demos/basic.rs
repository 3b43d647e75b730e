//! Callback subscriptions and live statistics.
//!
//! Run with: `cargo run --example basic`

use typebus::{BusConfig, EventBus, MessageLevel, MessageQueue};

struct UserLogin {
    id: u64,
}

fn main() {
    let bus = EventBus::new(BusConfig::default());

    // Callback handlers run inline during publish; no runtime needed.
    let login_sub = bus.subscribe::<UserLogin, _>("user:login", |login| {
        println!("handler: user {} logged in", login.id);
    });

    bus.publish("user:login", UserLogin { id: 1 });
    bus.publish("user:login", UserLogin { id: 2 });
    bus.publish("cache:warmed", ());

    // emit() derives the event type from the payload's type name.
    let typed_sub = bus.subscribe::<UserLogin, _>("UserLogin", |login| {
        println!("handler: emit() delivered user {}", login.id);
    });
    bus.emit(UserLogin { id: 3 });

    // The message queue is a bus producer like any other.
    let queue = MessageQueue::new(bus.clone(), 16);
    queue.push(MessageLevel::Info, "profile saved");
    queue.push(MessageLevel::Error, "sync failed");
    for msg in queue.take() {
        println!("message [{}] {}", msg.level.as_label(), msg.text);
    }

    let stats = bus.statistics();
    println!("total events: {}", stats.total_events);
    println!("active types: {:?}", bus.active_event_types());
    println!(
        "user:login subscribers: {}",
        bus.subscriber_count("user:login")
    );

    login_sub.cancel();
    typed_sub.cancel();
    bus.close();
}
