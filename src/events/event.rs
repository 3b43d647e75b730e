//! # Event envelope and dynamic payload.
//!
//! Every publish produces a fresh [`BusEvent`]: the type string chosen by the
//! publisher, the payload, a wall-clock timestamp, and a per-bus sequence
//! number. Envelopes are immutable and are not retained by the bus after
//! delivery (fire-and-forget, no history buffer).
//!
//! ## Ordering guarantees
//! `seq` increases monotonically per bus instance and is the authoritative
//! ordering key. `at` is same-process wall clock, kept for logs; it is
//! non-decreasing in publish order except across clock steps.
//!
//! ## Payload typing
//! Payloads are caller-trusted: [`EventPayload`] erases the concrete type,
//! and consumers recover it with [`EventPayload::downcast_ref`]. A consumer
//! asking for the wrong type simply sees nothing — there is no schema
//! registry.
//!
//! ## Example
//! ```
//! use typebus::{BusConfig, EventBus};
//!
//! struct CartUpdated { total: u32 }
//!
//! let bus = EventBus::new(BusConfig::default());
//! bus.publish("cart:updated", CartUpdated { total: 10 });
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Type-erased, cheaply cloneable event payload.
///
/// Wraps `Arc<dyn Any + Send + Sync>`; cloning shares the underlying
/// allocation. Recover the concrete type with [`EventPayload::downcast_ref`]
/// or [`EventPayload::downcast`].
#[derive(Clone)]
pub struct EventPayload(Arc<dyn Any + Send + Sync>);

impl EventPayload {
    /// Wraps a payload value.
    pub fn new<P: Any + Send + Sync>(payload: P) -> Self {
        Self(Arc::new(payload))
    }

    /// Returns `true` if the payload is a `P`.
    #[inline]
    pub fn is<P: Any + Send + Sync>(&self) -> bool {
        self.0.is::<P>()
    }

    /// Borrows the payload as a `P`, if it is one.
    #[inline]
    pub fn downcast_ref<P: Any + Send + Sync>(&self) -> Option<&P> {
        self.0.downcast_ref::<P>()
    }

    /// Returns a shared handle to the payload as a `P`, if it is one.
    #[inline]
    pub fn downcast<P: Any + Send + Sync>(&self) -> Option<Arc<P>> {
        Arc::clone(&self.0).downcast::<P>().ok()
    }
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventPayload")
    }
}

/// A published event: type string, payload, and delivery metadata.
///
/// - `seq`: per-bus monotonic sequence number (ordering key)
/// - `at`: wall-clock timestamp assigned at publish time (for logs)
#[derive(Clone, Debug)]
pub struct BusEvent {
    /// Event type string chosen by the publisher.
    pub event_type: Arc<str>,
    /// Type-erased payload.
    pub payload: EventPayload,
    /// Wall-clock timestamp assigned at publish time.
    pub at: SystemTime,
    /// Per-bus monotonic sequence number.
    pub seq: u64,
}

impl BusEvent {
    /// Creates an envelope stamped with the current wall-clock time.
    pub(crate) fn new(event_type: Arc<str>, payload: EventPayload, seq: u64) -> Self {
        Self {
            event_type,
            payload,
            at: SystemTime::now(),
            seq,
        }
    }

    /// Borrows the payload as a `P`, if it is one.
    ///
    /// Shorthand for `self.payload.downcast_ref::<P>()`.
    #[inline]
    pub fn payload_ref<P: Any + Send + Sync>(&self) -> Option<&P> {
        self.payload.downcast_ref::<P>()
    }
}

/// Derives the event type string [`EventBus::emit`](crate::EventBus::emit)
/// uses for a payload type.
///
/// Takes the last path segment of `std::any::type_name`, keeping generic
/// arguments verbatim: `my_app::events::UserLogin` becomes `UserLogin`,
/// `alloc::vec::Vec<alloc::string::String>` becomes
/// `Vec<alloc::string::String>`. Deterministic for every nameable type.
pub fn type_label(full: &str) -> &str {
    let head_end = full.find('<').unwrap_or(full.len());
    let start = full[..head_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}
