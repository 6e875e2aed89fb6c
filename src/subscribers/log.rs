//! # LogWriter: queue events to diagnostic log records.
//!
//! A subscriber that translates incoming [`Event`]s into calls on an injected
//! [`Logger`]. Installed by default with [`TracingLogger`](crate::TracingLogger).
//!
//! ## Level mapping
//! ```text
//! trace: task enqueued | attempt starting | task succeeded | retry scheduled
//!        queue closed  | queue drained
//! warn:  attempt failed | attempt timed out | task rejected
//! error: task failed permanently | shutdown grace exceeded
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::{Logger, Subscribe};

/// Event-to-log subscriber.
pub struct LogWriter {
    logger: Arc<dyn Logger>,
}

impl LogWriter {
    /// Wraps the given logger.
    #[must_use]
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let log = self.logger.as_ref();
        match e.kind {
            EventKind::TaskEnqueued => log.trace("task enqueued", e),
            EventKind::TaskStarting => log.trace("task attempt starting", e),
            EventKind::TaskSucceeded => log.trace("task succeeded", e),
            EventKind::BackoffScheduled => log.trace("task retry scheduled", e),
            EventKind::QueueClosed => log.trace("queue closed", e),
            EventKind::QueueDrained => log.trace("queue drained", e),
            EventKind::TaskFailed => log.warn("task attempt failed", e),
            EventKind::TimeoutHit => log.warn("task attempt timed out", e),
            EventKind::TaskRejected => log.warn("task rejected", e),
            EventKind::TaskExhausted => log.error("task failed permanently", e),
            EventKind::GraceExceeded => log.error("shutdown grace exceeded", e),
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }

    fn queue_capacity(&self) -> usize {
        4096
    }
}
