//! # typebus
//!
//! **typebus** is a typed in-process publish/subscribe event bus for Rust.
//!
//! It provides a process-wide event multiplexer with two subscription
//! styles — inline callbacks and pull-based streams — plus live usage
//! statistics, an isolated background-listener layer, and two small
//! bus-backed state services (loading tracker, message queue). The crate is
//! designed as a building block for decoupled application components: the
//! host constructs one [`EventBus`] and hands clones to everything that
//! publishes or subscribes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌─────────────┐  ┌─────────────┐  ┌──────────────────────────┐
//!  │ component A │  │ component B │  │ LoadingTracker /         │
//!  │ (publisher) │  │ (publisher) │  │ MessageQueue (publishers)│
//!  └──────┬──────┘  └──────┬──────┘  └────────────┬─────────────┘
//!         │ publish(type, payload) / emit(payload)│
//!         ▼                ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  EventBus                                                     │
//! │  - stamps BusEvent { type, payload, at, seq }                 │
//! │  - statistics (total / per-type publishes, subscriber counts) │
//! │  - broadcast channel (capacity: BusConfig::capacity)          │
//! │  - callback registry (per-type, registration order)           │
//! └──────┬──────────────────────┬─────────────────────────┬───────┘
//!        │ inline, synchronous  │ per-receiver FIFO       │
//!        ▼                      ▼                         ▼
//!  callback handlers      TypedStream<P> (on)       EventStream (all)
//!  (subscribe)            Arc<P> payloads           full envelopes
//!                                                        │
//!                                                        ▼
//!                                              ListenerSet workers
//!                                              (one task per Listen,
//!                                               panic/lag isolated)
//! ```
//!
//! ### Delivery
//! ```text
//! publish(type, payload)
//!   ├─► seq = next per-bus sequence number
//!   ├─► statistics: total += 1, event_counts[type] += 1
//!   ├─► broadcast send (every on()/all() receiver, no replay)
//!   └─► callback snapshot for type, invoked in registration order
//!         │
//!         ├─ handler subscribes/unsubscribes? → affects future passes only
//!         └─ handler panics? → propagates to the publisher; later handlers
//!            in this pass do not run (use ListenerSet for isolation)
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types                                 |
//! |-----------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Publishing**  | Fire-and-forget typed payloads under string event types.     | [`EventBus`], [`BusEvent`]                |
//! | **Callbacks**   | Inline handlers with explicit teardown.                      | [`HandlerSubscription`], [`HandlerId`]    |
//! | **Streams**     | Cold, pull-based receivers (per-type or subscribe-all).      | [`TypedStream`], [`EventStream`]          |
//! | **Statistics**  | Live publish/subscriber counters, owned snapshots.           | [`BusStatistics`]                         |
//! | **Listeners**   | Background workers with panic/lag isolation.                 | [`Listen`], [`ListenerSet`]               |
//! | **State**       | Bus-backed loading scopes and message queue.                 | [`LoadingTracker`], [`MessageQueue`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```
//! use typebus::{BusConfig, EventBus};
//!
//! struct UserLogin { id: u64 }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = EventBus::new(BusConfig::default());
//!
//!     // Callback style: runs inline during publish.
//!     let sub = bus.subscribe::<UserLogin, _>("user:login", |login| {
//!         println!("user {} logged in", login.id);
//!     });
//!
//!     // Stream style: pull payloads at your own pace.
//!     let mut logins = bus.on::<UserLogin>("user:login");
//!
//!     bus.publish("user:login", UserLogin { id: 1 });
//!     assert_eq!(logins.recv().await.unwrap().id, 1);
//!
//!     let stats = bus.statistics();
//!     assert_eq!(stats.total_events, 1);
//!
//!     sub.cancel();
//!     bus.close();
//! }
//! ```

mod config;
mod error;
mod events;
mod handlers;
mod listeners;
mod state;

// ---- Public re-exports ----

pub use config::BusConfig;
pub use error::{StreamError, TryStreamError};
pub use events::{BusEvent, BusStatistics, EventBus, EventPayload, EventStream, TypedStream};
pub use handlers::{HandlerId, HandlerSubscription};
pub use listeners::{Listen, ListenerLagged, ListenerPanic, ListenerSet};
pub use state::{
    LoadingChanged, LoadingGuard, LoadingTracker, Message, MessageLevel, MessageQueue,
    MessagesCleared,
};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogWriter;
