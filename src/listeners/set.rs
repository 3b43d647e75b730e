//! # Background fan-out to multiple listeners.
//!
//! [`ListenerSet`] spawns one worker task per listener, each consuming its
//! own subscribe-all stream. This is the isolation layer the inline callback
//! path deliberately does not provide: a slow listener lags and skips, a
//! panicking listener is caught and reported, and neither affects the
//! publisher or the other listeners.
//!
//! ## Architecture
//! ```text
//! publish(...)
//!     │
//!     └──► broadcast channel
//!             ├──► worker 1 ──► listener1.on_event()
//!             │        └────────► panic → ListenerPanic republished
//!             ├──► worker 2 ──► listener2.on_event()
//!             └──► worker N ──► listenerN.on_event()
//!                      └────────► lag → ListenerLagged republished
//! ```
//!
//! ## Rules
//! - **No cross-listener ordering**: listener A may process event N while B
//!   processes N+5. Per-listener order is the channel's FIFO.
//! - **Lag**: a worker that falls behind observes the skip count and keeps
//!   going from the oldest retained event; the gap is republished as a
//!   [`ListenerLagged`] event.
//! - **Panic isolation**: worker loops catch panics with `catch_unwind`,
//!   republish them as [`ListenerPanic`], and continue. A panic raised while
//!   handling a `ListenerPanic` event is not republished (no feedback
//!   loops).
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave a listener's
//! shared state inconsistent if it panics while holding a lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;
use crate::events::{BusEvent, EventBus};
use crate::listeners::listen::Listen;

/// Payload republished when a listener panics inside
/// [`Listen::on_event`].
#[derive(Clone, Debug)]
pub struct ListenerPanic {
    /// The listener's [`Listen::name`].
    pub listener: &'static str,
    /// Panic message, best effort.
    pub info: String,
}

impl ListenerPanic {
    /// Event type these diagnostics are published under.
    pub const EVENT_TYPE: &'static str = "bus:listener-panic";
}

/// Payload republished when a listener's receiver lags and skips events.
#[derive(Clone, Debug)]
pub struct ListenerLagged {
    /// The listener's [`Listen::name`].
    pub listener: &'static str,
    /// Number of events the channel dropped for this worker.
    pub skipped: u64,
}

impl ListenerLagged {
    /// Event type these diagnostics are published under.
    pub const EVENT_TYPE: &'static str = "bus:listener-lagged";
}

/// Fan-out coordinator for background event listeners.
///
/// Owns one worker task per listener. Workers run until the bus closes or
/// [`shutdown`](ListenerSet::shutdown) is called.
pub struct ListenerSet {
    token: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl ListenerSet {
    /// Spawns one worker task per listener.
    ///
    /// Each worker holds an independent subscribe-all stream created at
    /// spawn time, so listeners observe only events published after this
    /// call. Must run inside a tokio runtime.
    #[must_use]
    pub fn spawn(bus: &EventBus, listeners: Vec<Arc<dyn Listen>>) -> Self {
        let token = CancellationToken::new();
        let mut workers = Vec::with_capacity(listeners.len());

        for listener in listeners {
            let mut stream = bus.all();
            let bus = bus.clone();
            let worker_token = token.clone();

            workers.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = worker_token.cancelled() => break,
                        msg = stream.recv() => match msg {
                            Ok(ev) => deliver(&bus, listener.as_ref(), &ev).await,
                            Err(StreamError::Closed) => break,
                            Err(StreamError::Lagged(skipped)) => {
                                bus.publish(
                                    ListenerLagged::EVENT_TYPE,
                                    ListenerLagged { listener: listener.name(), skipped },
                                );
                                continue;
                            }
                        }
                    }
                }
            }));
        }
        Self { token, workers }
    }

    /// Gracefully shuts down all workers: cancel, then await each task.
    ///
    /// Events already pulled by a worker finish delivery; buffered events
    /// are abandoned.
    pub async fn shutdown(self) {
        self.token.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Runs one delivery, converting a panic into a `ListenerPanic` event.
async fn deliver(bus: &EventBus, listener: &dyn Listen, ev: &BusEvent) {
    let fut = listener.on_event(ev);
    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
        if ev.event_type.as_ref() == ListenerPanic::EVENT_TYPE {
            return;
        }
        let info = {
            let any = &*panic_err;
            if let Some(msg) = any.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = any.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            }
        };
        bus.publish(
            ListenerPanic::EVENT_TYPE,
            ListenerPanic {
                listener: listener.name(),
                info,
            },
        );
    }
}
