//! # Task: a unit of schedulable work.
//!
//! [`Task`] bundles a caller-supplied id, a zero-argument async operation and
//! optional per-task timeout / retry overrides. Unset overrides are filled from
//! [`QueueConfig`] when the task is enqueued.
//!
//! The operation is a `Fn` (not `FnOnce`): every attempt calls it again and gets a
//! fresh future. Share state between attempts explicitly with `Arc<...>` inside the closure.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskqueue::{Task, TaskError};
//!
//! let task = Task::new("refresh-cache", || async {
//!     // do work...
//!     Ok::<_, TaskError>(42)
//! })
//! .with_timeout(Duration::from_secs(2))
//! .with_retries(5);
//!
//! assert_eq!(task.id(), "refresh-cache");
//! assert_eq!(task.retries(), Some(5));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::core::QueueConfig;
use crate::error::TaskError;

/// Boxed future produced by one call of a task operation.
pub type BoxTaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TaskError>> + Send + 'static>>;

type Operation<T> = dyn Fn() -> BoxTaskFuture<T> + Send + Sync + 'static;

/// A unit of asynchronous work producing `T`.
pub struct Task<T> {
    id: Arc<str>,
    operation: Box<Operation<T>>,
    timeout: Option<Duration>,
    retries: Option<u32>,
}

impl<T: Send + 'static> Task<T> {
    /// Creates a task from an id and an operation.
    ///
    /// The operation may fail with any error convertible into [`TaskError`]
    /// (`TaskError` itself, `String`, `&str`, `anyhow::Error`).
    pub fn new<F, Fut, E>(id: impl Into<Arc<str>>, operation: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<TaskError> + 'static,
    {
        Self {
            id: id.into(),
            operation: Box::new(move || -> BoxTaskFuture<T> {
                let fut = operation();
                Box::pin(async move { fut.await.map_err(Into::<TaskError>::into) })
            }),
            timeout: None,
            retries: None,
        }
    }
}

impl<T> Task<T> {
    /// Overrides the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the number of retries after the first failed attempt.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Fills unset overrides from the queue configuration.
    pub fn with_defaults(mut self, cfg: &QueueConfig) -> Self {
        self.timeout.get_or_insert(cfg.default_timeout);
        self.retries.get_or_insert(cfg.default_retries);
        self
    }

    /// Returns the caller-supplied id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the shared id handle.
    pub(crate) fn id_arc(&self) -> Arc<str> {
        Arc::clone(&self.id)
    }

    /// Returns the timeout override, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the retries override, if any.
    pub fn retries(&self) -> Option<u32> {
        self.retries
    }

    /// Starts one attempt of the operation.
    pub(crate) fn spawn(&self) -> BoxTaskFuture<T> {
        (self.operation)()
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_only_unset_fields() {
        let cfg = QueueConfig::default();
        let task = Task::new("a", || async { Ok::<_, TaskError>(()) })
            .with_retries(7)
            .with_defaults(&cfg);
        assert_eq!(task.retries(), Some(7));
        assert_eq!(task.timeout(), Some(cfg.default_timeout));
    }

    #[tokio::test]
    async fn each_spawn_is_a_fresh_attempt() {
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let c = calls.clone();
        let task = Task::new("count", move || {
            let c = c.clone();
            async move { Ok::<_, TaskError>(c.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1) }
        });
        assert_eq!(task.spawn().await.unwrap(), 1);
        assert_eq!(task.spawn().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn string_errors_become_fail() {
        let task = Task::new("err", || async { Err::<(), _>("boom") });
        let err = task.spawn().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "execution failed: boom");
    }
}
