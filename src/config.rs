//! # Bus configuration.
//!
//! [`BusConfig`] controls the capacity of the shared broadcast channel that
//! backs stream-style subscriptions ([`EventBus::on`](crate::EventBus::on)
//! and [`EventBus::all`](crate::EventBus::all)).
//!
//! # Example
//! ```
//! use typebus::BusConfig;
//!
//! let mut cfg = BusConfig::default();
//! cfg.capacity = 256;
//!
//! assert_eq!(cfg.capacity, 256);
//! ```

/// Configuration for an [`EventBus`](crate::EventBus) instance.
///
/// Callback delivery is unbuffered (handlers run inline during publish), so
/// the only tunable is the stream side.
#[derive(Clone, Copy, Debug)]
pub struct BusConfig {
    /// Capacity of the shared broadcast channel (ring buffer of recent
    /// events, shared across all stream receivers). Clamped to a minimum
    /// of 1 at bus construction.
    pub capacity: usize,
}

impl Default for BusConfig {
    /// Provides a default configuration:
    /// - `capacity = 1024`
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity() {
        assert_eq!(BusConfig::default().capacity, 1024);
    }
}
