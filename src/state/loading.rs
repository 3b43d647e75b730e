//! # Reference-counted loading scopes.
//!
//! [`LoadingTracker`] answers "is anything loading right now?" for named
//! scopes: every in-flight operation holds the scope active, and the scope
//! goes idle when the last one finishes. Transitions are announced on the
//! bus as [`LoadingChanged`] events, so indicators can subscribe instead of
//! polling.
//!
//! ## Rules
//! - A scope is active while its count is above zero; the key is removed
//!   when the count drains (same key policy as the bus's subscriber counts).
//! - Only the 0→1 and 1→0 transitions publish events; nested starts and
//!   finishes inside an already-active scope are silent.
//! - Finishing a scope that is not active is a tolerated no-op.
//!
//! ## Example
//! ```
//! use typebus::{BusConfig, EventBus, LoadingTracker};
//!
//! let bus = EventBus::new(BusConfig::default());
//! let loading = LoadingTracker::new(bus.clone());
//!
//! {
//!     let _guard = loading.start("users");
//!     assert!(loading.is_loading("users"));
//! }
//! assert!(!loading.any_loading());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::events::EventBus;

/// Payload published on every scope activity transition.
#[derive(Clone, Debug)]
pub struct LoadingChanged {
    /// The scope that changed.
    pub scope: Arc<str>,
    /// `true` on 0→1 (went active), `false` on 1→0 (went idle).
    pub active: bool,
}

impl LoadingChanged {
    /// Event type these transitions are published under.
    pub const EVENT_TYPE: &'static str = "loading:changed";
}

struct TrackerInner {
    bus: EventBus,
    scopes: Mutex<HashMap<Arc<str>, usize>>,
}

impl TrackerInner {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Arc<str>, usize>> {
        self.scopes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start(&self, scope: &Arc<str>) {
        let went_active = {
            let mut scopes = self.lock();
            let count = scopes.entry(Arc::clone(scope)).or_insert(0);
            *count += 1;
            *count == 1
        };
        // Publish outside the lock: handlers may read the tracker back.
        if went_active {
            self.bus.publish(
                LoadingChanged::EVENT_TYPE,
                LoadingChanged {
                    scope: Arc::clone(scope),
                    active: true,
                },
            );
        }
    }

    fn finish(&self, scope: &str) {
        let went_idle = {
            let mut scopes = self.lock();
            match scopes.get_mut(scope) {
                Some(count) => {
                    *count -= 1;
                    if *count == 0 {
                        scopes.remove(scope);
                        true
                    } else {
                        false
                    }
                }
                None => false,
            }
        };
        if went_idle {
            self.bus.publish(
                LoadingChanged::EVENT_TYPE,
                LoadingChanged {
                    scope: Arc::from(scope),
                    active: false,
                },
            );
        }
    }
}

/// Tracks named, reference-counted loading scopes over a bus.
///
/// Cheap to clone; clones share the same scope table.
#[derive(Clone)]
pub struct LoadingTracker {
    inner: Arc<TrackerInner>,
}

impl LoadingTracker {
    /// Creates a tracker publishing transitions on `bus`.
    pub fn new(bus: EventBus) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                bus,
                scopes: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Marks one operation in `scope` as in flight.
    ///
    /// Returns a guard that finishes the operation when dropped (or via
    /// [`LoadingGuard::finish`]). The 0→1 transition publishes a
    /// [`LoadingChanged`] event.
    #[must_use = "dropping the guard immediately ends the loading scope"]
    pub fn start(&self, scope: impl Into<Arc<str>>) -> LoadingGuard {
        let scope = scope.into();
        self.inner.start(&scope);
        LoadingGuard {
            inner: Arc::clone(&self.inner),
            scope,
            finished: AtomicBool::new(false),
        }
    }

    /// Finishes one operation in `scope` without a guard.
    ///
    /// Counterpart for callers that track their own lifecycles. Finishing an
    /// inactive scope is a no-op.
    pub fn finish(&self, scope: &str) {
        self.inner.finish(scope);
    }

    /// Returns `true` while `scope` has operations in flight.
    pub fn is_loading(&self, scope: &str) -> bool {
        self.inner.lock().contains_key(scope)
    }

    /// Returns `true` while any scope has operations in flight.
    pub fn any_loading(&self) -> bool {
        !self.inner.lock().is_empty()
    }

    /// Sorted list of currently active scopes.
    pub fn active_scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self.inner.lock().keys().map(|s| s.to_string()).collect();
        scopes.sort_unstable();
        scopes
    }
}

impl std::fmt::Debug for LoadingTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingTracker")
            .field("active_scopes", &self.active_scopes())
            .finish()
    }
}

/// Guard for one in-flight operation; finishes its scope on drop.
pub struct LoadingGuard {
    inner: Arc<TrackerInner>,
    scope: Arc<str>,
    finished: AtomicBool,
}

impl LoadingGuard {
    /// The scope this guard holds active.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Finishes the operation now instead of at drop. Idempotent.
    pub fn finish(&self) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.finish(&self.scope);
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;
    use std::sync::atomic::AtomicUsize;

    fn tracker() -> (EventBus, LoadingTracker) {
        let bus = EventBus::new(BusConfig::default());
        let tracker = LoadingTracker::new(bus.clone());
        (bus, tracker)
    }

    #[test]
    fn nested_starts_keep_scope_active() {
        let (_bus, loading) = tracker();
        let outer = loading.start("users");
        let inner = loading.start("users");
        assert!(loading.is_loading("users"));

        inner.finish();
        assert!(loading.is_loading("users"));
        outer.finish();
        assert!(!loading.is_loading("users"));
        assert!(!loading.any_loading());
    }

    #[test]
    fn guard_drop_finishes() {
        let (_bus, loading) = tracker();
        {
            let _guard = loading.start("sync");
            assert!(loading.any_loading());
        }
        assert!(!loading.any_loading());
    }

    #[test]
    fn guard_finish_is_idempotent() {
        let (_bus, loading) = tracker();
        let other = loading.start("x");
        let guard = loading.start("x");
        guard.finish();
        guard.finish();
        drop(guard);
        // Only one of the two operations ended.
        assert!(loading.is_loading("x"));
        drop(other);
        assert!(!loading.is_loading("x"));
    }

    #[test]
    fn finish_without_start_is_noop() {
        let (_bus, loading) = tracker();
        loading.finish("never-started");
        assert!(!loading.any_loading());
    }

    #[test]
    fn transitions_publish_loading_changed() {
        let (bus, loading) = tracker();
        let transitions = Arc::new(std::sync::Mutex::new(Vec::new()));
        let transitions_clone = Arc::clone(&transitions);
        let _sub = bus.subscribe::<LoadingChanged, _>(LoadingChanged::EVENT_TYPE, move |change| {
            transitions_clone
                .lock()
                .unwrap()
                .push((change.scope.to_string(), change.active));
        });

        let outer = loading.start("users");
        let inner = loading.start("users");
        inner.finish();
        outer.finish();

        // Only the 0→1 and 1→0 edges are announced.
        assert_eq!(
            *transitions.lock().unwrap(),
            vec![("users".to_string(), true), ("users".to_string(), false)]
        );
    }

    #[test]
    fn handlers_can_read_tracker_back() {
        let (bus, loading) = tracker();
        let observed = Arc::new(AtomicUsize::new(0));
        let observed_clone = Arc::clone(&observed);
        let loading_clone = loading.clone();
        let _sub = bus.subscribe::<LoadingChanged, _>(LoadingChanged::EVENT_TYPE, move |change| {
            // Re-entrant read during publish must not deadlock.
            let active = loading_clone.is_loading(&change.scope);
            assert_eq!(active, change.active);
            observed_clone.fetch_add(1, Ordering::SeqCst);
        });

        let guard = loading.start("jobs");
        guard.finish();
        assert_eq!(observed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn active_scopes_sorted() {
        let (_bus, loading) = tracker();
        let _b = loading.start("b");
        let _a = loading.start("a");
        assert_eq!(loading.active_scopes(), vec!["a", "b"]);
    }
}
