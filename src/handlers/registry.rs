//! # Callback handler registry.
//!
//! Maps event type strings to ordered lists of registered handlers. This is
//! the callback half of the bus; stream subscriptions live on the shared
//! broadcast channel and never touch this registry.
//!
//! ## Rules
//! - **Registration order**: handlers for a type are invoked in the order
//!   they were registered.
//! - **Snapshot delivery**: `snapshot()` clones the handler list so a
//!   delivery pass iterates a frozen view. A handler that subscribes or
//!   unsubscribes mid-delivery changes only future publishes, never the pass
//!   in flight.
//! - **Identity by id**: closures have no usable equality, so every entry
//!   carries a bus-unique [`HandlerId`]. Removal is gated on the id actually
//!   being present, which is what makes double-cancel a no-op.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::events::BusEvent;

/// Opaque identifier for a registered callback handler.
///
/// Returned via [`HandlerSubscription::id`](crate::HandlerSubscription::id)
/// and accepted by [`EventBus::unsubscribe`](crate::EventBus::unsubscribe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(pub(crate) u64);

/// A registered handler: id plus the type-erased callback.
#[derive(Clone)]
pub(crate) struct HandlerEntry {
    pub(crate) id: HandlerId,
    pub(crate) callback: Arc<dyn Fn(&BusEvent) + Send + Sync>,
}

/// Callback registry shared between the bus and subscription handles.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    map: RwLock<HashMap<Arc<str>, Vec<HandlerEntry>>>,
}

impl HandlerRegistry {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Arc<str>, Vec<HandlerEntry>>> {
        self.map.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Arc<str>, Vec<HandlerEntry>>> {
        self.map.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a handler for `event_type`.
    pub(crate) fn insert(&self, event_type: Arc<str>, entry: HandlerEntry) {
        self.write().entry(event_type).or_default().push(entry);
    }

    /// Removes the handler with `id` under `event_type`.
    ///
    /// Returns `true` if an entry was actually removed. Unknown types and
    /// unknown ids are no-ops.
    pub(crate) fn remove(&self, event_type: &str, id: HandlerId) -> bool {
        let mut map = self.write();
        let Some(entries) = map.get_mut(event_type) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            map.remove(event_type);
        }
        removed
    }

    /// Frozen view of the handlers for `event_type`, in registration order.
    ///
    /// Cloning the list is cheap (entries are `Arc`-backed) and is what
    /// keeps a delivery pass immune to re-entrant mutation.
    pub(crate) fn snapshot(&self, event_type: &str) -> Vec<HandlerEntry> {
        self.read().get(event_type).cloned().unwrap_or_default()
    }

    /// Removes every handler for `event_type`, returning how many there were.
    pub(crate) fn clear_type(&self, event_type: &str) -> usize {
        self.write()
            .remove(event_type)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Removes every handler for every type, returning per-type counts.
    pub(crate) fn clear_all(&self) -> Vec<(Arc<str>, usize)> {
        self.write()
            .drain()
            .map(|(ty, entries)| (ty, entries.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(id: u64) -> HandlerEntry {
        HandlerEntry {
            id: HandlerId(id),
            callback: Arc::new(|_| {}),
        }
    }

    #[test]
    fn snapshot_preserves_registration_order() {
        let registry = HandlerRegistry::default();
        registry.insert(Arc::from("x"), entry(1));
        registry.insert(Arc::from("x"), entry(2));
        registry.insert(Arc::from("x"), entry(3));

        let ids: Vec<u64> = registry
            .snapshot("x")
            .iter()
            .map(|entry| entry.id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn remove_is_gated_on_presence() {
        let registry = HandlerRegistry::default();
        registry.insert(Arc::from("x"), entry(1));

        assert!(registry.remove("x", HandlerId(1)));
        assert!(!registry.remove("x", HandlerId(1)));
        assert!(!registry.remove("never", HandlerId(1)));
        assert!(registry.snapshot("x").is_empty());
    }

    #[test]
    fn clear_type_reports_count() {
        let registry = HandlerRegistry::default();
        registry.insert(Arc::from("x"), entry(1));
        registry.insert(Arc::from("x"), entry(2));
        registry.insert(Arc::from("y"), entry(3));

        assert_eq!(registry.clear_type("x"), 2);
        assert_eq!(registry.clear_type("x"), 0);
        assert_eq!(registry.snapshot("y").len(), 1);
    }

    #[test]
    fn clear_all_reports_per_type_counts() {
        let registry = HandlerRegistry::default();
        registry.insert(Arc::from("x"), entry(1));
        registry.insert(Arc::from("x"), entry(2));
        registry.insert(Arc::from("y"), entry(3));

        let mut cleared = registry.clear_all();
        cleared.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(cleared.len(), 2);
        assert_eq!((cleared[0].0.as_ref(), cleared[0].1), ("x", 2));
        assert_eq!((cleared[1].0.as_ref(), cleared[1].1), ("y", 1));
    }

    #[test]
    fn snapshot_is_frozen_against_mutation() {
        let registry = HandlerRegistry::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        registry.insert(
            Arc::from("x"),
            HandlerEntry {
                id: HandlerId(1),
                callback: Arc::new(move |_| {
                    calls_clone.fetch_add(1, Ordering::SeqCst);
                }),
            },
        );

        let snapshot = registry.snapshot("x");
        registry.remove("x", HandlerId(1));

        // The frozen view still carries the handler removed above.
        let ev = crate::events::BusEvent::new(
            Arc::from("x"),
            crate::events::EventPayload::new(()),
            0,
        );
        for entry in &snapshot {
            (entry.callback)(&ev);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.snapshot("x").is_empty());
    }
}
