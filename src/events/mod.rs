//! Event data model, the bus core, streams, and statistics.
//!
//! This module groups the event **data model** and the **bus** that
//! publishes to and multiplexes over it.
//!
//! ## Contents
//! - [`BusEvent`], [`EventPayload`] — envelope and type-erased payload
//! - [`EventBus`] — the multiplexer (publish/emit, both subscription styles)
//! - [`EventStream`], [`TypedStream`] — stream-side receivers
//! - [`BusStatistics`] — owned statistics snapshots
//!
//! ## Quick reference
//! - **Publishers**: application components, the state services
//!   ([`LoadingTracker`](crate::LoadingTracker),
//!   [`MessageQueue`](crate::MessageQueue)), and
//!   [`ListenerSet`](crate::ListenerSet) workers (panic/lag diagnostics).
//! - **Consumers**: callback handlers (inline), stream receivers (pull), and
//!   listener workers (background tasks over [`EventBus::all`]).

mod bus;
mod event;
mod stats;
mod stream;

pub use bus::EventBus;
pub use event::{BusEvent, EventPayload};
pub use stats::BusStatistics;
pub use stream::{EventStream, TypedStream};

pub(crate) use event::type_label;
pub(crate) use stats::StatsRegistry;
