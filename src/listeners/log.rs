//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] prints every event to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and the demos.
//!
//! ## Output format
//! ```text
//! [user:login] seq=0
//! [cart:updated] seq=1
//! [bus:listener-panic] seq=2 listener=audit info="..."
//! ```
//!
//! ## Example
//! ```no_run
//! # use std::sync::Arc;
//! # use typebus::{BusConfig, EventBus, ListenerSet, LogWriter};
//! # async fn demo() {
//! let bus = EventBus::new(BusConfig::default());
//! let set = ListenerSet::spawn(&bus, vec![Arc::new(LogWriter)]);
//! // LogWriter prints all events to stdout until shutdown.
//! # set.shutdown().await;
//! # }
//! ```

use async_trait::async_trait;

use crate::events::BusEvent;
use crate::listeners::listen::Listen;
use crate::listeners::set::{ListenerLagged, ListenerPanic};

/// Simple stdout logging listener.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Listen`] for structured logging or metrics
/// collection.
pub struct LogWriter;

#[async_trait]
impl Listen for LogWriter {
    async fn on_event(&self, ev: &BusEvent) {
        if let Some(panic) = ev.payload_ref::<ListenerPanic>() {
            println!(
                "[{}] seq={} listener={} info={:?}",
                ev.event_type, ev.seq, panic.listener, panic.info
            );
        } else if let Some(lag) = ev.payload_ref::<ListenerLagged>() {
            println!(
                "[{}] seq={} listener={} skipped={}",
                ev.event_type, ev.seq, lag.listener, lag.skipped
            );
        } else {
            println!("[{}] seq={}", ev.event_type, ev.seq);
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
