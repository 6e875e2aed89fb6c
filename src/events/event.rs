//! # Queue events emitted by the dispatcher and task executors.
//!
//! The [`EventKind`] enum classifies events across two categories:
//! - **Task lifecycle**: enqueue, attempt start, success, failure, timeout, backoff, exhaustion
//! - **Queue lifecycle**: closed, drained, grace exceeded
//!
//! The [`Event`] struct carries optional metadata such as the task id, the internal
//! task key, attempt counters, durations and the error message.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are observed out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskqueue::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("sync-profile")
//!     .with_attempt(2, 3)
//!     .with_error("boom")
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("sync-profile"));
//! assert_eq!(ev.attempt, Some(2));
//! assert_eq!(ev.timeout_ms, Some(5_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of queue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Task lifecycle ===
    /// Task accepted and appended to the pending list.
    ///
    /// Sets: `task`, `key`, `timeout_ms`, `max_attempts`.
    TaskEnqueued,

    /// Task refused because the queue is closed.
    ///
    /// Sets: `task`, `error`.
    TaskRejected,

    /// An attempt is about to run.
    ///
    /// Sets: `task`, `key`, `attempt` (1-based), `max_attempts`.
    TaskStarting,

    /// The operation resolved before its timeout.
    ///
    /// Sets: `task`, `key`, `attempt`, `max_attempts`.
    TaskSucceeded,

    /// One attempt failed (operation error, timeout or panic).
    ///
    /// Sets: `task`, `key`, `attempt`, `max_attempts`, `error`.
    TaskFailed,

    /// The attempt exceeded its timeout (always followed by `TaskFailed`).
    ///
    /// Sets: `task`, `key`, `attempt`, `timeout_ms`.
    TimeoutHit,

    /// Next attempt scheduled after a failure.
    ///
    /// Sets: `task`, `key`, `attempt` (the failed one), `max_attempts`, `delay_ms`, `error`.
    BackoffScheduled,

    /// Terminal failure: no attempts left or the error is not retryable.
    ///
    /// Sets: `task`, `key`, `attempt`, `max_attempts`, `error`.
    TaskExhausted,

    // === Queue lifecycle ===
    /// Intake closed; accepted tasks keep running.
    QueueClosed,

    /// Every accepted task finished after close.
    QueueDrained,

    /// Shutdown grace period elapsed with tasks still in flight.
    ///
    /// Sets: `delay_ms` (the grace period), `error` (ids of stuck tasks).
    GraceExceeded,
}

/// Queue event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Caller-supplied task id, if applicable.
    pub task: Option<Arc<str>>,
    /// Internal per-enqueue key (distinguishes tasks sharing an id).
    pub key: Option<u64>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Total attempts allowed for the task (`retries + 1`).
    pub max_attempts: Option<u32>,
    /// Task timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Backoff delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable error or reason.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            key: None,
            attempt: None,
            max_attempts: None,
            timeout_ms: None,
            delay_ms: None,
            error: None,
        }
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the internal task key.
    #[inline]
    pub fn with_key(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }

    /// Attaches the attempt number and the attempt budget.
    #[inline]
    pub fn with_attempt(mut self, attempt: u32, max_attempts: u32) -> Self {
        self.attempt = Some(attempt);
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Attaches only the attempt budget.
    #[inline]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an error message or reason.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::TaskEnqueued);
        let b = Event::new(EventKind::TaskStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn durations_saturate_at_u32() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
