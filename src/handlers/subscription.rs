//! # Callback subscription handle.
//!
//! [`HandlerSubscription`] is what
//! [`EventBus::subscribe`](crate::EventBus::subscribe) returns: a detachable
//! handle whose [`cancel`](HandlerSubscription::cancel) removes exactly the
//! handler it was created for.
//!
//! ## Rules
//! - `cancel()` is idempotent: the second and later calls are no-ops and
//!   never double-decrement the subscriber count.
//! - Dropping the handle does **not** cancel the subscription. The consumer
//!   owns its teardown and calls `cancel()` (or
//!   [`EventBus::unsubscribe`](crate::EventBus::unsubscribe) with the
//!   handle's [`id`](HandlerSubscription::id)) exactly once when it is done.
//!   Typed streams behave differently — their handle *is* the subscription
//!   and dropping it unsubscribes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::events::StatsRegistry;
use crate::handlers::registry::{HandlerId, HandlerRegistry};

/// Handle to a registered callback handler.
///
/// Created by [`EventBus::subscribe`](crate::EventBus::subscribe).
pub struct HandlerSubscription {
    handlers: Arc<HandlerRegistry>,
    stats: Arc<StatsRegistry>,
    event_type: Arc<str>,
    id: HandlerId,
    cancelled: AtomicBool,
}

impl HandlerSubscription {
    pub(crate) fn new(
        handlers: Arc<HandlerRegistry>,
        stats: Arc<StatsRegistry>,
        event_type: Arc<str>,
        id: HandlerId,
    ) -> Self {
        Self {
            handlers,
            stats,
            event_type,
            id,
            cancelled: AtomicBool::new(false),
        }
    }

    /// The handler's bus-unique id, usable with
    /// [`EventBus::unsubscribe`](crate::EventBus::unsubscribe).
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// The event type this handler is registered under.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Removes the handler from the registry and decrements the subscriber
    /// count for its type.
    ///
    /// Idempotent: repeated calls are no-ops. Also a no-op if the handler
    /// was already removed through another path (manual
    /// [`EventBus::unsubscribe`](crate::EventBus::unsubscribe),
    /// [`EventBus::clear_subscribers`](crate::EventBus::clear_subscribers),
    /// or bus teardown) — the decrement is gated on the registry actually
    /// holding the entry.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.handlers.remove(&self.event_type, self.id) {
            self.stats.remove_subscriber(&self.event_type);
        }
    }
}

impl std::fmt::Debug for HandlerSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSubscription")
            .field("event_type", &self.event_type)
            .field("id", &self.id)
            .field("cancelled", &self.cancelled.load(Ordering::SeqCst))
            .finish()
    }
}
