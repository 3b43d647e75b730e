//! # Live usage statistics.
//!
//! The bus maintains three pieces of statistics state alongside its
//! registries:
//! - `total_published`: monotonic counter across all types;
//! - `event_counts`: per-type publish counters (keys survive until an
//!   explicit [`reset`](StatsRegistry::reset_publish_counts));
//! - `subscriber_counts`: per-type count of currently registered callback
//!   handlers and typed stream subscriptions (keys are removed when the
//!   count drains to zero).
//!
//! The two maps deliberately have different key-removal policies:
//! `event_counts` records history ("types ever published since the last
//! reset"), `subscriber_counts` records present interest ("types somebody is
//! watching right now"). [`active_event_types`](StatsRegistry::active_event_types)
//! is defined over the former.
//!
//! [`BusStatistics`] snapshots are owned copies — mutating the bus after the
//! call never changes a previously returned snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Point-in-time copy of the bus statistics.
///
/// Returned by [`EventBus::statistics`](crate::EventBus::statistics).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusStatistics {
    /// Number of publishes since creation or the last statistics reset.
    pub total_events: u64,
    /// Per-type publish counts since creation or the last statistics reset.
    pub event_counts: HashMap<String, u64>,
    /// Per-type count of currently registered subscribers (callback handlers
    /// plus typed stream subscriptions).
    pub subscriber_counts: HashMap<String, usize>,
}

#[derive(Default)]
struct StatsInner {
    total_published: u64,
    event_counts: HashMap<Arc<str>, u64>,
    subscriber_counts: HashMap<Arc<str>, usize>,
}

/// Internal statistics state, shared between the bus and subscription
/// handles.
#[derive(Default)]
pub(crate) struct StatsRegistry {
    inner: Mutex<StatsInner>,
}

impl StatsRegistry {
    /// Locks the state, recovering from poisoning.
    ///
    /// Handlers never run under this lock, so a poisoned mutex can only mean
    /// a panic inside the bus's own bookkeeping; the data is still coherent.
    fn lock(&self) -> std::sync::MutexGuard<'_, StatsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one publish of `event_type`.
    pub(crate) fn record_publish(&self, event_type: &Arc<str>) {
        let mut inner = self.lock();
        inner.total_published += 1;
        *inner
            .event_counts
            .entry(Arc::clone(event_type))
            .or_insert(0) += 1;
    }

    /// Registers one subscriber for `event_type`.
    pub(crate) fn add_subscriber(&self, event_type: &Arc<str>) {
        let mut inner = self.lock();
        *inner
            .subscriber_counts
            .entry(Arc::clone(event_type))
            .or_insert(0) += 1;
    }

    /// Deregisters `n` subscribers for `event_type`.
    ///
    /// Floors at zero and removes the key when the count drains.
    pub(crate) fn remove_subscribers(&self, event_type: &str, n: usize) {
        if n == 0 {
            return;
        }
        let mut inner = self.lock();
        if let Some(count) = inner.subscriber_counts.get_mut(event_type) {
            *count = count.saturating_sub(n);
            if *count == 0 {
                inner.subscriber_counts.remove(event_type);
            }
        }
    }

    /// Deregisters one subscriber for `event_type`.
    pub(crate) fn remove_subscriber(&self, event_type: &str) {
        self.remove_subscribers(event_type, 1);
    }

    /// Current number of subscribers for `event_type` (0 if none).
    pub(crate) fn subscriber_count(&self, event_type: &str) -> usize {
        self.lock()
            .subscriber_counts
            .get(event_type)
            .copied()
            .unwrap_or(0)
    }

    /// Sorted list of types published at least once since the last reset.
    pub(crate) fn active_event_types(&self) -> Vec<String> {
        let inner = self.lock();
        let mut types: Vec<String> = inner
            .event_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(ty, _)| ty.to_string())
            .collect();
        types.sort_unstable();
        types
    }

    /// Owned snapshot of all counters.
    pub(crate) fn snapshot(&self) -> BusStatistics {
        let inner = self.lock();
        BusStatistics {
            total_events: inner.total_published,
            event_counts: inner
                .event_counts
                .iter()
                .map(|(ty, count)| (ty.to_string(), *count))
                .collect(),
            subscriber_counts: inner
                .subscriber_counts
                .iter()
                .map(|(ty, count)| (ty.to_string(), *count))
                .collect(),
        }
    }

    /// Zeroes `total_published` and clears `event_counts`.
    ///
    /// Subscriber counts are untouched: subscribers are still registered,
    /// only publish history resets.
    pub(crate) fn reset_publish_counts(&self) {
        let mut inner = self.lock();
        inner.total_published = 0;
        inner.event_counts.clear();
    }

    /// Clears `subscriber_counts` (bus teardown only).
    pub(crate) fn clear_subscriber_counts(&self) {
        self.lock().subscriber_counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[test]
    fn publish_counts_accumulate() {
        let stats = StatsRegistry::default();
        stats.record_publish(&ty("a"));
        stats.record_publish(&ty("a"));
        stats.record_publish(&ty("b"));

        let snap = stats.snapshot();
        assert_eq!(snap.total_events, 3);
        assert_eq!(snap.event_counts.get("a"), Some(&2));
        assert_eq!(snap.event_counts.get("b"), Some(&1));
    }

    #[test]
    fn subscriber_key_removed_at_zero() {
        let stats = StatsRegistry::default();
        stats.add_subscriber(&ty("a"));
        stats.add_subscriber(&ty("a"));
        assert_eq!(stats.subscriber_count("a"), 2);

        stats.remove_subscriber("a");
        assert_eq!(stats.subscriber_count("a"), 1);
        stats.remove_subscriber("a");
        assert_eq!(stats.subscriber_count("a"), 0);
        assert!(stats.snapshot().subscriber_counts.is_empty());
    }

    #[test]
    fn remove_floors_at_zero() {
        let stats = StatsRegistry::default();
        stats.add_subscriber(&ty("a"));
        stats.remove_subscribers("a", 5);
        assert_eq!(stats.subscriber_count("a"), 0);
        stats.remove_subscriber("a");
        assert_eq!(stats.subscriber_count("a"), 0);
        stats.remove_subscriber("never-registered");
        assert_eq!(stats.subscriber_count("never-registered"), 0);
    }

    #[test]
    fn active_types_sorted_and_survive_zero_subscribers() {
        let stats = StatsRegistry::default();
        stats.record_publish(&ty("b"));
        stats.record_publish(&ty("a"));
        assert_eq!(stats.active_event_types(), vec!["a", "b"]);
    }

    #[test]
    fn reset_keeps_subscriber_counts() {
        let stats = StatsRegistry::default();
        stats.record_publish(&ty("a"));
        stats.add_subscriber(&ty("a"));
        stats.reset_publish_counts();

        let snap = stats.snapshot();
        assert_eq!(snap.total_events, 0);
        assert!(snap.event_counts.is_empty());
        assert_eq!(snap.subscriber_counts.get("a"), Some(&1));
    }

    #[test]
    fn snapshot_is_a_copy() {
        let stats = StatsRegistry::default();
        stats.record_publish(&ty("a"));
        let before = stats.snapshot();
        stats.record_publish(&ty("a"));
        assert_eq!(before.event_counts.get("a"), Some(&1));
        assert_eq!(stats.snapshot().event_counts.get("a"), Some(&2));
    }
}
