//! # Bounded queue of user-facing messages.
//!
//! [`MessageQueue`] buffers leveled notifications (info, success, warning,
//! error) until something displays them. The queue is bounded: pushing into
//! a full queue evicts the oldest message. Every push is announced on the
//! bus as a [`MessageQueue::PUSHED_EVENT_TYPE`] event carrying the stamped
//! [`Message`], and clearing a non-empty queue announces
//! [`MessagesCleared`].
//!
//! ## Example
//! ```
//! use typebus::{BusConfig, EventBus, MessageLevel, MessageQueue};
//!
//! let bus = EventBus::new(BusConfig::default());
//! let queue = MessageQueue::new(bus, 16);
//!
//! queue.push(MessageLevel::Info, "profile saved");
//! queue.push(MessageLevel::Error, "sync failed");
//!
//! let pending = queue.take();
//! assert_eq!(pending.len(), 2);
//! assert!(queue.is_empty());
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::events::EventBus;

/// Severity of a queued message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageLevel {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            MessageLevel::Info => "info",
            MessageLevel::Success => "success",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        }
    }
}

/// A stamped message.
#[derive(Clone, Debug)]
pub struct Message {
    /// Severity.
    pub level: MessageLevel,
    /// Display text.
    pub text: Arc<str>,
    /// Wall-clock timestamp assigned at push time.
    pub at: SystemTime,
    /// Per-queue monotonic sequence number.
    pub seq: u64,
}

/// Payload published when a non-empty queue is cleared.
#[derive(Clone, Copy, Debug)]
pub struct MessagesCleared {
    /// How many messages were discarded.
    pub dropped: usize,
}

struct QueueState {
    next_seq: u64,
    messages: VecDeque<Message>,
}

struct QueueInner {
    bus: EventBus,
    capacity: usize,
    state: Mutex<QueueState>,
}

/// Bounded FIFO of user-facing messages over a bus.
///
/// Cheap to clone; clones share the same queue.
#[derive(Clone)]
pub struct MessageQueue {
    inner: Arc<QueueInner>,
}

impl MessageQueue {
    /// Event type published for every accepted message.
    pub const PUSHED_EVENT_TYPE: &'static str = "message:pushed";
    /// Event type published when a non-empty queue is cleared.
    pub const CLEARED_EVENT_TYPE: &'static str = "message:cleared";

    /// Creates a queue publishing on `bus`.
    ///
    /// `capacity` is clamped to a minimum of 1.
    pub fn new(bus: EventBus, capacity: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                bus,
                capacity: capacity.max(1),
                state: Mutex::new(QueueState {
                    next_seq: 0,
                    messages: VecDeque::new(),
                }),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a message, evicting the oldest when the queue is full.
    ///
    /// Returns the stamped message; the same value rides the
    /// [`PUSHED_EVENT_TYPE`](Self::PUSHED_EVENT_TYPE) event.
    pub fn push(&self, level: MessageLevel, text: impl Into<Arc<str>>) -> Message {
        let message = {
            let mut state = self.lock();
            let message = Message {
                level,
                text: text.into(),
                at: SystemTime::now(),
                seq: state.next_seq,
            };
            state.next_seq += 1;
            if state.messages.len() == self.inner.capacity {
                state.messages.pop_front();
            }
            state.messages.push_back(message.clone());
            message
        };
        // Publish outside the lock: handlers may read the queue back.
        self.inner
            .bus
            .publish(Self::PUSHED_EVENT_TYPE, message.clone());
        message
    }

    /// Drains all pending messages in FIFO order.
    pub fn take(&self) -> Vec<Message> {
        self.lock().messages.drain(..).collect()
    }

    /// Discards all pending messages.
    ///
    /// Publishes [`MessagesCleared`] only when something was actually
    /// dropped; clearing an empty queue is silent.
    pub fn clear(&self) {
        let dropped = {
            let mut state = self.lock();
            let dropped = state.messages.len();
            state.messages.clear();
            dropped
        };
        if dropped > 0 {
            self.inner
                .bus
                .publish(Self::CLEARED_EVENT_TYPE, MessagesCleared { dropped });
        }
    }

    /// Snapshot of the pending messages, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.iter().cloned().collect()
    }

    /// Number of pending messages.
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    /// Returns `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }
}

impl std::fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageQueue")
            .field("capacity", &self.inner.capacity)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;

    fn queue(capacity: usize) -> (EventBus, MessageQueue) {
        let bus = EventBus::new(BusConfig::default());
        let queue = MessageQueue::new(bus.clone(), capacity);
        (bus, queue)
    }

    #[test]
    fn fifo_order_and_drain() {
        let (_bus, queue) = queue(8);
        queue.push(MessageLevel::Info, "first");
        queue.push(MessageLevel::Error, "second");

        let drained = queue.take();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].text.as_ref(), "first");
        assert_eq!(drained[1].text.as_ref(), "second");
        assert_eq!(drained[0].level, MessageLevel::Info);
        assert!(drained[0].seq < drained[1].seq);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_evicts_oldest() {
        let (_bus, queue) = queue(2);
        queue.push(MessageLevel::Info, "a");
        queue.push(MessageLevel::Info, "b");
        queue.push(MessageLevel::Info, "c");

        let texts: Vec<_> = queue
            .messages()
            .iter()
            .map(|m| m.text.to_string())
            .collect();
        assert_eq!(texts, vec!["b", "c"]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn capacity_clamped_to_one() {
        let (_bus, queue) = queue(0);
        queue.push(MessageLevel::Info, "a");
        queue.push(MessageLevel::Info, "b");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.messages()[0].text.as_ref(), "b");
    }

    #[test]
    fn pushes_ride_the_bus() {
        let (bus, queue) = queue(8);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let _sub = bus.subscribe::<Message, _>(MessageQueue::PUSHED_EVENT_TYPE, move |msg| {
            seen_clone
                .lock()
                .unwrap()
                .push((msg.level, msg.text.to_string()));
        });

        queue.push(MessageLevel::Warning, "low disk");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(MessageLevel::Warning, "low disk".to_string())]
        );
    }

    #[test]
    fn clear_publishes_only_when_nonempty() {
        let (bus, queue) = queue(8);
        let cleared = Arc::new(Mutex::new(Vec::new()));
        let cleared_clone = Arc::clone(&cleared);
        let _sub =
            bus.subscribe::<MessagesCleared, _>(MessageQueue::CLEARED_EVENT_TYPE, move |ev| {
                cleared_clone.lock().unwrap().push(ev.dropped);
            });

        queue.clear();
        queue.push(MessageLevel::Info, "a");
        queue.push(MessageLevel::Info, "b");
        queue.clear();

        assert_eq!(*cleared.lock().unwrap(), vec![2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn handlers_can_read_queue_back() {
        let (bus, queue) = queue(8);
        let queue_clone = queue.clone();
        let _sub = bus.subscribe::<Message, _>(MessageQueue::PUSHED_EVENT_TYPE, move |msg| {
            // Re-entrant read during publish must not deadlock.
            assert!(queue_clone.len() >= 1);
            assert_eq!(queue_clone.messages().last().unwrap().seq, msg.seq);
        });

        queue.push(MessageLevel::Success, "done");
    }

    #[test]
    fn level_labels() {
        assert_eq!(MessageLevel::Info.as_label(), "info");
        assert_eq!(MessageLevel::Error.as_label(), "error");
    }
}
