//! Error types used by the queue runtime and by task operations.
//!
//! - [`TaskError`]: failure of a single task attempt (or of the whole task once retries are exhausted).
//! - [`EnqueueError`]: a task could not be accepted by the queue.
//! - [`QueueError`]: the queue could not be constructed.
//! - [`RuntimeError`]: the queue failed to shut down cleanly.
//!
//! All types provide `as_label` for logs/metrics.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by task execution.
///
/// `Fail`, `Timeout` and `Panicked` are retried while the task has attempts left;
/// `Fatal` ends the task immediately.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The attempt did not settle within the task timeout.
    #[error("task '{task}' timed out after {timeout:?}")]
    Timeout {
        /// Id of the task that timed out.
        task: Arc<str>,
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The operation failed; the task may succeed if retried.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable error; remaining retries are skipped.
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The operation panicked; treated like a failed attempt.
    #[error("operation panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The task was dropped before it settled (forced shutdown).
    #[error("task cancelled before completion")]
    Canceled,
}

impl TaskError {
    /// Shorthand for a retryable [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskqueue::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert!(err.is_retryable());
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Shorthand for a non-retryable [`TaskError::Fatal`].
    pub fn fatal(error: impl Display) -> Self {
        TaskError::Fatal {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use taskqueue::TaskError;
    ///
    /// let err = TaskError::Timeout { task: "sync".into(), timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Indicates whether another attempt may be made after this error.
    ///
    /// Returns `true` for [`TaskError::Fail`], [`TaskError::Timeout`] and [`TaskError::Panicked`].
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TaskError::Fail { .. } | TaskError::Timeout { .. } | TaskError::Panicked { .. }
        )
    }
}

impl From<String> for TaskError {
    fn from(error: String) -> Self {
        TaskError::Fail { error }
    }
}

impl From<&str> for TaskError {
    fn from(error: &str) -> Self {
        TaskError::fail(error)
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(error: anyhow::Error) -> Self {
        TaskError::Fail {
            error: format!("{error:#}"),
        }
    }
}

/// # Errors returned when a task cannot be accepted.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnqueueError {
    /// The queue no longer accepts tasks (closed, shut down, or dropped).
    #[error("queue closed; task '{task}' rejected")]
    Closed {
        /// Id of the rejected task.
        task: Arc<str>,
    },

    /// The task carries an explicit zero timeout.
    #[error("task '{task}' has a zero timeout")]
    InvalidTimeout {
        /// Id of the rejected task.
        task: Arc<str>,
    },
}

impl EnqueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EnqueueError::Closed { .. } => "enqueue_closed",
            EnqueueError::InvalidTimeout { .. } => "enqueue_invalid_timeout",
        }
    }
}

/// # Errors raised while building a queue.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// A configuration value is out of range.
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The queue was built outside of a Tokio runtime.
    #[error("no tokio runtime available to spawn the dispatcher")]
    NoRuntime,
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::InvalidConfig { .. } => "queue_invalid_config",
            QueueError::NoRuntime => "queue_no_runtime",
        }
    }
}

/// # Errors produced while stopping the queue.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; remaining tasks were aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Ids of the tasks that were still in flight, in key order.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use taskqueue::RuntimeError;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(TaskError::fail("x").is_retryable());
        assert!(
            TaskError::Timeout {
                task: "t".into(),
                timeout: Duration::from_millis(10),
            }
            .is_retryable()
        );
        assert!(TaskError::Panicked { info: "x".into() }.is_retryable());
        assert!(!TaskError::fatal("x").is_retryable());
        assert!(!TaskError::Canceled.is_retryable());
    }

    #[test]
    fn timeout_message_carries_task_id() {
        let err = TaskError::Timeout {
            task: "fetch-users".into(),
            timeout: Duration::from_millis(250),
        };
        assert!(err.to_string().contains("fetch-users"));
    }

    #[test]
    fn conversions_produce_fail() {
        let from_str: TaskError = "boom".into();
        assert_eq!(from_str.as_label(), "task_failed");

        let from_anyhow: TaskError = anyhow::anyhow!("disk full").context("writing").into();
        match from_anyhow {
            TaskError::Fail { error } => assert_eq!(error, "writing: disk full"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
