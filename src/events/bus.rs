//! # The event bus core.
//!
//! [`EventBus`] is a process-wide typed event multiplexer: producers publish
//! `(type, payload)` pairs, the bus stamps an envelope, updates live usage
//! statistics, and fans the event out synchronously to every interested
//! party.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Consumers:
//!   component A ──┐                       ┌──► EventStream (all)
//!   component B ──┼──► EventBus ──────────┼──► TypedStream<P> (on)
//!   component N ──┘        │  (broadcast) └──► ... lag-tolerant, per-receiver FIFO
//!                          │
//!                          └─ callback registry ──► handler 1 ──► handler 2 ──► ...
//!                                      (invoked inline, registration order)
//! ```
//!
//! ## Rules
//! - **Synchronous fan-out**: `publish` does all delivery inline on the
//!   calling thread — a broadcast send for the stream side, then the
//!   callback handlers for the type in registration order. No queueing, no
//!   async hop.
//! - **Best effort**: zero subscribers, unknown types, and empty type
//!   strings are all tolerated; `publish` never fails on their account.
//! - **Snapshot delivery**: the handler list is frozen before iterating, so
//!   a handler subscribing or unsubscribing mid-delivery affects only future
//!   publishes.
//! - **Handler panics propagate**: the bus does not catch, log, or isolate
//!   handler panics — one panicking handler unwinds into the publisher's
//!   call site and later handlers in that pass do not run. Counters are
//!   already updated and no lock is held during handler invocation, so the
//!   bus itself stays consistent. Publishers that need isolation use the
//!   [`ListenerSet`](crate::ListenerSet) worker layer instead.
//! - **Two teardown seams**: `clear_subscribers`/`clear_all_subscribers`
//!   affect the callback registry only; stream handles are cancelled by
//!   dropping them.
//!
//! ## Example
//! ```
//! use typebus::{BusConfig, EventBus};
//!
//! struct UserLogin { id: u64 }
//!
//! let bus = EventBus::new(BusConfig::default());
//! let sub = bus.subscribe::<UserLogin, _>("user:login", |login| {
//!     println!("user {} logged in", login.id);
//! });
//!
//! bus.publish("user:login", UserLogin { id: 1 });
//! assert_eq!(bus.subscriber_count("user:login"), 1);
//! sub.cancel();
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::config::BusConfig;
use crate::events::event::{type_label, BusEvent, EventPayload};
use crate::events::stats::{BusStatistics, StatsRegistry};
use crate::events::stream::{EventStream, TypedStream};
use crate::handlers::{HandlerEntry, HandlerId, HandlerRegistry, HandlerSubscription};

struct BusInner {
    /// Shared multicast channel; `None` after `close()` so receivers drain
    /// and then observe `Closed`.
    tx: RwLock<Option<broadcast::Sender<BusEvent>>>,
    handlers: Arc<HandlerRegistry>,
    stats: Arc<StatsRegistry>,
    seq: AtomicU64,
    next_handler_id: AtomicU64,
    closed: AtomicBool,
}

/// Process-wide typed event multiplexer.
///
/// Cheap to clone (internally `Arc`-backed); the host application constructs
/// exactly one and hands clones to every component that publishes or
/// subscribes. There is no implicit global — unit tests construct as many
/// isolated buses as they need.
///
/// ### Properties
/// - **Send + Sync**: registries and counters sit behind locks, so
///   concurrent publishers on multiple threads never lose or double-count.
/// - **Fire-and-forget**: events are not retained after delivery; a
///   subscriber created after a publish does not see it.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates a new bus.
    ///
    /// The broadcast capacity is clamped to a minimum of 1.
    pub fn new(config: BusConfig) -> Self {
        let capacity = config.capacity.max(1);
        let (tx, _rx) = broadcast::channel::<BusEvent>(capacity);
        Self {
            inner: Arc::new(BusInner {
                tx: RwLock::new(Some(tx)),
                handlers: Arc::new(HandlerRegistry::default()),
                stats: Arc::new(StatsRegistry::default()),
                seq: AtomicU64::new(0),
                next_handler_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    // ---------------------------
    // Publishing
    // ---------------------------

    /// Publishes a payload under `event_type`.
    ///
    /// Builds a [`BusEvent`], bumps the publish counters, then delivers
    /// synchronously: one broadcast send covering every stream subscriber
    /// (typed and subscribe-all), then every callback handler registered for
    /// the type, in registration order.
    ///
    /// Empty type strings are legal but discouraged. Publishing with no
    /// subscribers is a silent no-op fan-out; publishing on a closed bus is
    /// a silent no-op and does not count.
    pub fn publish<P: Any + Send + Sync>(&self, event_type: impl Into<Arc<str>>, payload: P) {
        self.publish_payload(event_type.into(), EventPayload::new(payload));
    }

    /// Publishes a payload under a type derived from its Rust type name.
    ///
    /// Sugar over [`publish`](Self::publish) for class-per-event modeling:
    /// the type string is the last path segment of the payload's
    /// `std::any::type_name` (generic arguments kept verbatim), so
    /// `events::UserLogin` publishes as `"UserLogin"`. Deterministic for
    /// every nameable type.
    pub fn emit<P: Any + Send + Sync>(&self, payload: P) {
        let label: Arc<str> = Arc::from(type_label(std::any::type_name::<P>()));
        self.publish_payload(label, EventPayload::new(payload));
    }

    fn publish_payload(&self, event_type: Arc<str>, payload: EventPayload) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }

        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed);
        let event = BusEvent::new(Arc::clone(&event_type), payload, seq);
        self.inner.stats.record_publish(&event_type);

        // Stream side first, so stream and callback consumers observe the
        // same per-publish order.
        if let Some(tx) = self.tx_read().as_ref() {
            let _ = tx.send(event.clone());
        }

        // Frozen view; re-entrant subscribe/unsubscribe from inside a
        // handler only affects future publishes.
        let snapshot = self.inner.handlers.snapshot(&event_type);
        for entry in &snapshot {
            (entry.callback)(&event);
        }
    }

    // ---------------------------
    // Stream subscriptions
    // ---------------------------

    /// Subscribes to future payloads of one event type.
    ///
    /// The stream is cold (no replay) and counts toward
    /// [`subscriber_count`](Self::subscriber_count) for as long as the
    /// handle lives; dropping the handle is the cancellation.
    pub fn on<P: Any + Send + Sync>(&self, event_type: impl Into<Arc<str>>) -> TypedStream<P> {
        TypedStream::new(
            self.raw_receiver(),
            event_type.into(),
            Arc::clone(&self.inner.stats),
        )
    }

    /// Subscribes to every future event, full envelope included.
    ///
    /// A global listener: not tracked in per-type subscriber counts.
    pub fn all(&self) -> EventStream {
        EventStream::new(self.raw_receiver())
    }

    fn raw_receiver(&self) -> broadcast::Receiver<BusEvent> {
        match self.tx_read().as_ref() {
            Some(tx) => tx.subscribe(),
            // Closed bus: hand out a receiver whose channel is already dead.
            None => broadcast::channel(1).1,
        }
    }

    // ---------------------------
    // Callback subscriptions
    // ---------------------------

    /// Registers a callback handler for one event type.
    ///
    /// The handler runs inline during [`publish`](Self::publish) for every
    /// matching event whose payload is a `P` (payload types are
    /// caller-trusted; mismatches are skipped silently). Registering the
    /// same closure twice creates two independent registrations.
    ///
    /// The returned handle does not auto-cancel on drop — call
    /// [`HandlerSubscription::cancel`] (or
    /// [`unsubscribe`](Self::unsubscribe) with the handle's id) exactly once
    /// at teardown.
    pub fn subscribe<P, F>(
        &self,
        event_type: impl Into<Arc<str>>,
        handler: F,
    ) -> HandlerSubscription
    where
        P: Any + Send + Sync,
        F: Fn(&P) + Send + Sync + 'static,
    {
        let callback: Arc<dyn Fn(&BusEvent) + Send + Sync> = Arc::new(move |ev: &BusEvent| {
            if let Some(payload) = ev.payload.downcast_ref::<P>() {
                handler(payload);
            }
        });
        self.subscribe_raw(event_type.into(), callback)
    }

    /// Registers a callback handler that receives the full envelope.
    ///
    /// Same registry and same accounting as [`subscribe`](Self::subscribe),
    /// without the payload downcast.
    pub fn subscribe_event<F>(
        &self,
        event_type: impl Into<Arc<str>>,
        handler: F,
    ) -> HandlerSubscription
    where
        F: Fn(&BusEvent) + Send + Sync + 'static,
    {
        self.subscribe_raw(event_type.into(), Arc::new(handler))
    }

    fn subscribe_raw(
        &self,
        event_type: Arc<str>,
        callback: Arc<dyn Fn(&BusEvent) + Send + Sync>,
    ) -> HandlerSubscription {
        let id = HandlerId(self.inner.next_handler_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .handlers
            .insert(Arc::clone(&event_type), HandlerEntry { id, callback });
        self.inner.stats.add_subscriber(&event_type);
        HandlerSubscription::new(
            Arc::clone(&self.inner.handlers),
            Arc::clone(&self.inner.stats),
            event_type,
            id,
        )
    }

    /// Removes the callback handler with `id` under `event_type`.
    ///
    /// Manual removal path, equivalent to
    /// [`HandlerSubscription::cancel`] on the handle that produced the id.
    /// Unknown types and ids — including ids already removed through another
    /// path — are tolerated no-ops, so mixing the two paths can never
    /// double-decrement.
    pub fn unsubscribe(&self, event_type: &str, id: HandlerId) {
        if self.inner.handlers.remove(event_type, id) {
            self.inner.stats.remove_subscriber(event_type);
        }
    }

    /// Removes every callback handler for one event type.
    ///
    /// Stream subscriptions created via [`on`](Self::on) / [`all`](Self::all)
    /// are a separate mechanism and are **not** affected — they are
    /// cancelled by dropping their own handles.
    pub fn clear_subscribers(&self, event_type: &str) {
        let removed = self.inner.handlers.clear_type(event_type);
        self.inner.stats.remove_subscribers(event_type, removed);
    }

    /// Removes every callback handler for every event type.
    ///
    /// Same asymmetry as [`clear_subscribers`](Self::clear_subscribers):
    /// stream subscriptions are untouched.
    pub fn clear_all_subscribers(&self) {
        for (event_type, removed) in self.inner.handlers.clear_all() {
            self.inner.stats.remove_subscribers(&event_type, removed);
        }
    }

    // ---------------------------
    // Diagnostics
    // ---------------------------

    /// Current number of subscribers for `event_type`: callback handlers
    /// plus live typed streams. Subscribe-all streams are not counted.
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.inner.stats.subscriber_count(event_type)
    }

    /// Returns `true` if `event_type` currently has any subscribers.
    pub fn has_subscribers(&self, event_type: &str) -> bool {
        self.subscriber_count(event_type) > 0
    }

    /// Sorted list of event types published at least once since creation or
    /// the last [`reset_statistics`](Self::reset_statistics).
    ///
    /// Publish history, not current interest: a type stays listed after its
    /// last subscriber goes away.
    pub fn active_event_types(&self) -> Vec<String> {
        self.inner.stats.active_event_types()
    }

    /// Point-in-time copy of the usage statistics.
    ///
    /// The snapshot is owned: mutating the bus afterwards never changes a
    /// previously returned value.
    pub fn statistics(&self) -> BusStatistics {
        self.inner.stats.snapshot()
    }

    /// Zeroes the publish counters (`total_events`, per-type event counts).
    ///
    /// Subscriber counts are untouched — subscribers are still registered,
    /// only publish history resets. Intended for test isolation.
    pub fn reset_statistics(&self) {
        self.inner.stats.reset_publish_counts();
    }

    // ---------------------------
    // Teardown
    // ---------------------------

    /// Returns `true` once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Closes the bus: completes the shared stream (receivers drain buffered
    /// events, then observe `Closed`), clears the callback registry and
    /// subscriber counts, and turns further publishes into no-ops.
    ///
    /// Idempotent; expected to fire once at process shutdown since the bus
    /// is a process-wide singleton.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.tx_write().take();
        self.inner.handlers.clear_all();
        self.inner.stats.clear_subscriber_counts();
    }

    fn tx_read(&self) -> std::sync::RwLockReadGuard<'_, Option<broadcast::Sender<BusEvent>>> {
        self.inner.tx.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn tx_write(&self) -> std::sync::RwLockWriteGuard<'_, Option<broadcast::Sender<BusEvent>>> {
        self.inner
            .tx
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
