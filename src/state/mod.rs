//! # Ephemeral UI-facing state services.
//!
//! Small state holders that live next to the bus and use it to announce
//! their transitions: a reference-counted loading tracker and a bounded
//! message queue. Both are producers *and* showcases of the bus API — they
//! publish typed payloads under stable event types and never require their
//! consumers to poll.

mod loading;
mod messages;

pub use loading::{LoadingChanged, LoadingGuard, LoadingTracker};
pub use messages::{Message, MessageLevel, MessageQueue, MessagesCleared};
