//! # Background event listeners.
//!
//! This module provides the [`Listen`] trait and the [`ListenerSet`] worker
//! layer for consumers that want isolation instead of the inline callback
//! path.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   publisher ── publish(type, payload) ──► EventBus ──► broadcast channel
//!                                                            │
//!                                                 one worker per listener
//!                                                            │
//!                                               ┌────────────┼───────────┐
//!                                               ▼            ▼           ▼
//!                                           LogWriter     Metrics     Custom
//! ```
//!
//! ## Listener types
//! - **Passive listeners** — observe and react (logging, metrics, alerts)
//! - **Stateful listeners** — maintain internal state from the event flow
//!
//! ## Implementing custom listeners
//! ```
//! use typebus::{BusEvent, Listen};
//! use async_trait::async_trait;
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Listen for Metrics {
//!     async fn on_event(&self, event: &BusEvent) {
//!         if event.event_type.as_ref() == "task:failed" {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

mod listen;
mod set;

#[cfg(feature = "logging")]
mod log;

pub use listen::Listen;
pub use set::{ListenerLagged, ListenerPanic, ListenerSet};

#[cfg(feature = "logging")]
pub use log::LogWriter;
