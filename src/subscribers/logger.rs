//! # Diagnostic logger capability.
//!
//! [`Logger`] is the minimal `{trace, warn, error}` interface the queue logs through.
//! It is injected at construction (see [`QueueBuilder::with_logger`](crate::QueueBuilder::with_logger))
//! instead of being looked up from global state, so tests can pass a stub.
//!
//! [`TracingLogger`] is the default implementation; it forwards to the `tracing`
//! facade with the event metadata as structured fields. The crate never installs
//! a `tracing` subscriber itself.

use crate::events::Event;

/// Minimal structured logger.
///
/// `event` is the context object: task id, key, attempt counters, durations and error.
/// Implementations must not block; they run on a subscriber worker.
pub trait Logger: Send + Sync + 'static {
    /// Fine-grained progress (enqueue, attempt start, success, backoff).
    fn trace(&self, message: &str, event: &Event);

    /// Recoverable problems (a failed or timed-out attempt).
    fn warn(&self, message: &str, event: &Event);

    /// Terminal problems (a task that exhausted its attempts).
    fn error(&self, message: &str, event: &Event);
}

/// [`Logger`] backed by the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn trace(&self, message: &str, event: &Event) {
        tracing::trace!(
            task = event.task.as_deref(),
            key = event.key,
            attempt = event.attempt,
            max_attempts = event.max_attempts,
            delay_ms = event.delay_ms,
            "{message}"
        );
    }

    fn warn(&self, message: &str, event: &Event) {
        tracing::warn!(
            task = event.task.as_deref(),
            key = event.key,
            attempt = event.attempt,
            max_attempts = event.max_attempts,
            timeout_ms = event.timeout_ms,
            error = event.error.as_deref(),
            "{message}"
        );
    }

    fn error(&self, message: &str, event: &Event) {
        tracing::error!(
            task = event.task.as_deref(),
            key = event.key,
            attempt = event.attempt,
            max_attempts = event.max_attempts,
            error = event.error.as_deref(),
            "{message}"
        );
    }
}
