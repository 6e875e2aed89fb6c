//! # Queue configuration.
//!
//! [`QueueConfig`] centralizes the settings of one queue instance. It is fixed at
//! construction and used in two ways:
//! 1. **Queue creation**: `TaskQueue::new(config)` / `TaskQueue::builder(config)`
//! 2. **Task defaults**: `Task::with_defaults(&config)` at enqueue time
//!
//! The default values (concurrency 3, timeout 10s, 2 retries, 50ms linear backoff)
//! are starting points; override them for the workload at hand.

use std::time::Duration;

use crate::error::QueueError;
use crate::policies::BackoffPolicy;

/// Configuration of a [`TaskQueue`](crate::TaskQueue).
///
/// ## Field semantics
/// - `max_concurrency`: tasks executing at the same time (must be `> 0`)
/// - `default_timeout`: per-attempt timeout for tasks without their own (must be `> 0`)
/// - `default_retries`: extra attempts after the first failure for tasks without their own
/// - `backoff`: delay between a failed attempt and the next one
#[derive(Clone, Debug, PartialEq)]
pub struct QueueConfig {
    /// Maximum number of tasks executing simultaneously.
    pub max_concurrency: usize,

    /// Per-attempt timeout applied to tasks that do not set one.
    pub default_timeout: Duration,

    /// Retries applied to tasks that do not set their own.
    ///
    /// A task makes at most `retries + 1` attempts.
    pub default_retries: u32,

    /// Retry delay policy shared by all tasks of the queue.
    pub backoff: BackoffPolicy,
}

impl QueueConfig {
    /// Checks that every field is in range.
    ///
    /// # Errors
    /// [`QueueError::InvalidConfig`] for a zero concurrency limit or a zero timeout.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.max_concurrency == 0 {
            return Err(QueueError::InvalidConfig {
                field: "max_concurrency",
                reason: "must be greater than zero",
            });
        }
        if self.default_timeout.is_zero() {
            return Err(QueueError::InvalidConfig {
                field: "default_timeout",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Sets `max_concurrency`.
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n;
        self
    }

    /// Sets `default_timeout`.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets `default_retries`.
    pub fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    /// Sets `backoff`.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `max_concurrency = 3`
    /// - `default_timeout = 10s`
    /// - `default_retries = 2`
    /// - `backoff = BackoffPolicy::default()` (50ms × attempt)
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            default_timeout: Duration::from_secs(10),
            default_retries: 2,
            backoff: BackoffPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = QueueConfig::default();
        assert_eq!(cfg.max_concurrency, 3);
        assert_eq!(cfg.default_timeout, Duration::from_secs(10));
        assert_eq!(cfg.default_retries, 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = QueueConfig::default().with_max_concurrency(0).validate().unwrap_err();
        assert_eq!(
            err,
            QueueError::InvalidConfig {
                field: "max_concurrency",
                reason: "must be greater than zero",
            }
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = QueueConfig::default()
            .with_default_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert_eq!(err.as_label(), "queue_invalid_config");
    }
}
