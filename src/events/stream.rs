//! # Stream-style subscriptions.
//!
//! Both stream flavors are cold: a receiver observes only events published
//! after it was created. There is no replay and no history buffer beyond the
//! channel's ring of recent events.
//!
//! - [`EventStream`] ([`EventBus::all`](crate::EventBus::all)): every event,
//!   full envelope. Not counted in per-type subscriber statistics — it is a
//!   global listener.
//! - [`TypedStream`] ([`EventBus::on`](crate::EventBus::on)): payloads of one
//!   event type, already downcast. Counted in per-type subscriber statistics
//!   for its lifetime; dropping the handle is the cancellation.
//!
//! ## Lag
//! The shared channel keeps a bounded ring of recent events
//! ([`BusConfig::capacity`](crate::BusConfig)). A receiver that falls behind
//! observes [`StreamError::Lagged`] once per gap and then resumes at the
//! oldest retained event, exactly like the underlying
//! `tokio::sync::broadcast` receiver.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::{StreamError, TryStreamError};
use crate::events::event::BusEvent;
use crate::events::stats::StatsRegistry;

fn map_recv(err: broadcast::error::RecvError) -> StreamError {
    match err {
        broadcast::error::RecvError::Closed => StreamError::Closed,
        broadcast::error::RecvError::Lagged(n) => StreamError::Lagged(n),
    }
}

fn map_try_recv(err: broadcast::error::TryRecvError) -> TryStreamError {
    match err {
        broadcast::error::TryRecvError::Empty => TryStreamError::Empty,
        broadcast::error::TryRecvError::Closed => TryStreamError::Closed,
        broadcast::error::TryRecvError::Lagged(n) => TryStreamError::Lagged(n),
    }
}

/// Stream of every published event, full envelope included.
///
/// Created by [`EventBus::all`](crate::EventBus::all). Dropping the stream
/// detaches it from the channel.
pub struct EventStream {
    rx: broadcast::Receiver<BusEvent>,
}

impl EventStream {
    pub(crate) fn new(rx: broadcast::Receiver<BusEvent>) -> Self {
        Self { rx }
    }

    /// Awaits the next event.
    ///
    /// Returns [`StreamError::Closed`] once the bus is closed and the
    /// channel is drained, [`StreamError::Lagged`] if this receiver fell
    /// behind (the stream stays usable).
    pub async fn recv(&mut self) -> Result<BusEvent, StreamError> {
        self.rx.recv().await.map_err(map_recv)
    }

    /// Returns the next event if one is already buffered.
    pub fn try_recv(&mut self) -> Result<BusEvent, TryStreamError> {
        self.rx.try_recv().map_err(map_try_recv)
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

/// Decrements the per-type subscriber count when a typed stream goes away.
struct CountGuard {
    stats: Arc<StatsRegistry>,
    event_type: Arc<str>,
}

impl Drop for CountGuard {
    fn drop(&mut self) {
        self.stats.remove_subscriber(&self.event_type);
    }
}

/// Stream of payloads for a single event type.
///
/// Created by [`EventBus::on`](crate::EventBus::on). The handle *is* the
/// subscription: while it lives, its type counts toward
/// [`EventBus::subscriber_count`](crate::EventBus::subscriber_count);
/// dropping it decrements the count.
///
/// Events of other types pass through silently, as do events of the right
/// type whose payload is not a `P` (payload types are caller-trusted).
pub struct TypedStream<P> {
    rx: broadcast::Receiver<BusEvent>,
    event_type: Arc<str>,
    _guard: CountGuard,
    _marker: PhantomData<fn() -> P>,
}

impl<P: Any + Send + Sync> TypedStream<P> {
    pub(crate) fn new(
        rx: broadcast::Receiver<BusEvent>,
        event_type: Arc<str>,
        stats: Arc<StatsRegistry>,
    ) -> Self {
        stats.add_subscriber(&event_type);
        Self {
            rx,
            event_type: Arc::clone(&event_type),
            _guard: CountGuard { stats, event_type },
            _marker: PhantomData,
        }
    }

    /// The event type this stream is filtered on.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Awaits the next matching payload.
    ///
    /// Skips events of other types and events whose payload is not a `P`.
    /// Returns [`StreamError::Closed`] once the bus is closed and the
    /// channel is drained, [`StreamError::Lagged`] if this receiver fell
    /// behind (the stream stays usable).
    pub async fn recv(&mut self) -> Result<Arc<P>, StreamError> {
        loop {
            let ev = self.rx.recv().await.map_err(map_recv)?;
            if let Some(payload) = self.filter(&ev) {
                return Ok(payload);
            }
        }
    }

    /// Returns the next matching payload if one is already buffered.
    pub fn try_recv(&mut self) -> Result<Arc<P>, TryStreamError> {
        loop {
            let ev = self.rx.try_recv().map_err(map_try_recv)?;
            if let Some(payload) = self.filter(&ev) {
                return Ok(payload);
            }
        }
    }

    fn filter(&self, ev: &BusEvent) -> Option<Arc<P>> {
        if ev.event_type == self.event_type {
            ev.payload.downcast::<P>()
        } else {
            None
        }
    }
}

impl<P> std::fmt::Debug for TypedStream<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedStream")
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}
