//! # Core listener trait.
//!
//! `Listen` is the extension point for plugging background event consumers
//! into the bus. Each listener is driven by a dedicated worker task owned by
//! the [`ListenerSet`](crate::ListenerSet), fed from its own subscribe-all
//! stream.
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries) — they do **not**
//!   block the publisher nor other listeners. A listener that falls behind
//!   lags on its own stream and skips old events.
//! - Panics inside `on_event` are caught by the worker and republished as a
//!   [`ListenerPanic`](crate::ListenerPanic) event; the worker keeps
//!   processing.
//!
//! ## Example (skeleton)
//! ```
//! use typebus::{BusEvent, Listen};
//! use async_trait::async_trait;
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Listen for Audit {
//!     async fn on_event(&self, ev: &BusEvent) {
//!         // write audit record...
//!         let _ = ev.seq;
//!     }
//!     fn name(&self) -> &'static str {
//!         "audit"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{type_label, BusEvent};

/// Contract for background event listeners.
///
/// Called from a listener-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative
/// waits).
#[async_trait]
pub trait Listen: Send + Sync + 'static {
    /// Handle a single event for this listener.
    async fn on_event(&self, event: &BusEvent);

    /// Human-readable name (for panic/lag diagnostics).
    fn name(&self) -> &'static str {
        type_label(std::any::type_name::<Self>())
    }
}
