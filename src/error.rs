//! Error types surfaced by event stream receivers.
//!
//! The bus API itself never fails on account of caller misuse: publishing
//! with no subscribers, cancelling a subscription twice, or unsubscribing a
//! handler that was never registered are all silent no-ops. The only fallible
//! surface is the receiving end of a stream, which can observe the shared
//! channel closing or its own receiver falling behind.
//!
//! Both enums provide `as_label()` for short stable identifiers in
//! logs/metrics.

use thiserror::Error;

/// # Errors observed while awaiting the next event on a stream.
///
/// Returned by [`EventStream::recv`](crate::EventStream::recv) and
/// [`TypedStream::recv`](crate::TypedStream::recv).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// The bus was closed; no further events will be delivered.
    #[error("event stream closed")]
    Closed,

    /// The receiver fell behind and the channel dropped the reported number
    /// of old events.
    ///
    /// The stream is still usable: the next `recv()` resumes at the oldest
    /// retained event.
    #[error("event stream lagged; skipped {0} events")]
    Lagged(u64),
}

impl StreamError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typebus::StreamError;
    ///
    /// assert_eq!(StreamError::Closed.as_label(), "stream_closed");
    /// assert_eq!(StreamError::Lagged(3).as_label(), "stream_lagged");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Closed => "stream_closed",
            StreamError::Lagged(_) => "stream_lagged",
        }
    }
}

/// # Errors observed while polling a stream without waiting.
///
/// Returned by [`EventStream::try_recv`](crate::EventStream::try_recv) and
/// [`TypedStream::try_recv`](crate::TypedStream::try_recv).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryStreamError {
    /// No event is currently available.
    #[error("no event available")]
    Empty,

    /// The bus was closed and all buffered events have been drained.
    #[error("event stream closed")]
    Closed,

    /// The receiver fell behind and the channel dropped the reported number
    /// of old events.
    #[error("event stream lagged; skipped {0} events")]
    Lagged(u64),
}

impl TryStreamError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TryStreamError::Empty => "stream_empty",
            TryStreamError::Closed => "stream_closed",
            TryStreamError::Lagged(_) => "stream_lagged",
        }
    }
}
