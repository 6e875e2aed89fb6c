use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64},
};

use tokio::{runtime::Handle, sync::mpsc};
use tokio_util::sync::CancellationToken;

use super::{
    config::QueueConfig,
    dispatcher::Dispatcher,
    queue::{Shared, TaskQueue},
    stats::Gauges,
    tracker::InFlightTracker,
};
use crate::{
    error::QueueError,
    subscribers::{LogWriter, Logger, Subscribe, SubscriberSet, TracingLogger},
};

/// Builder for constructing a [`TaskQueue`] with a custom logger or extra subscribers.
pub struct QueueBuilder {
    cfg: QueueConfig,
    logger: Option<Arc<dyn Logger>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl QueueBuilder {
    /// Creates a new builder with the given configuration and the [`TracingLogger`].
    pub fn new(cfg: QueueConfig) -> Self {
        Self {
            cfg,
            logger: Some(Arc::new(TracingLogger)),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the logger that receives queue diagnostics.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Disables logging entirely.
    pub fn without_logger(mut self) -> Self {
        self.logger = None;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive queue events (task lifecycle, failures, shutdown)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the queue and spawns its dispatcher on the current Tokio runtime.
    ///
    /// # Errors
    /// - [`QueueError::InvalidConfig`] if the configuration fails validation
    /// - [`QueueError::NoRuntime`] if called outside a Tokio runtime
    pub fn build(self) -> Result<TaskQueue, QueueError> {
        self.cfg.validate()?;
        let rt = Handle::try_current().map_err(|_| QueueError::NoRuntime)?;

        let mut subscribers = self.subscribers;
        if let Some(logger) = self.logger {
            subscribers.insert(0, Arc::new(LogWriter::new(logger)));
        }
        let subs = Arc::new(SubscriberSet::new(subscribers, &rt));
        let gauges = Arc::new(Gauges::default());
        let tracker = Arc::new(InFlightTracker::new());

        let (tx, rx) = mpsc::unbounded_channel();
        let abort = CancellationToken::new();
        let finished = CancellationToken::new();

        let dispatcher = Dispatcher::new(
            self.cfg.max_concurrency,
            rx,
            Arc::clone(&tracker),
            Arc::clone(&gauges),
            Arc::clone(&subs),
        );
        let abort_child = abort.clone();
        let done = finished.clone().drop_guard();
        rt.spawn(async move {
            let _done = done;
            dispatcher.run(abort_child).await;
        });

        let shared = Arc::new(Shared {
            cfg: self.cfg,
            subs,
            gauges,
            tracker,
            next_key: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            abort,
            finished,
        });
        Ok(TaskQueue::from_parts(tx, shared))
    }
}
