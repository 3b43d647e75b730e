//! # Callback-style subscriptions.
//!
//! The callback half of the bus: a registry mapping event types to ordered
//! handler lists, and the subscription handle used to tear a registration
//! down again.
//!
//! Callback and stream subscriptions are two different mechanisms with
//! separate teardown paths:
//! - callbacks are removed via [`HandlerSubscription::cancel`],
//!   [`EventBus::unsubscribe`](crate::EventBus::unsubscribe), or the
//!   `clear_subscribers` family;
//! - streams ([`EventBus::on`](crate::EventBus::on) /
//!   [`EventBus::all`](crate::EventBus::all)) are cancelled only by dropping
//!   their own handles. Clearing callbacks never touches them.

mod registry;
mod subscription;

pub use registry::HandlerId;
pub use subscription::HandlerSubscription;

pub(crate) use registry::{HandlerEntry, HandlerRegistry};
