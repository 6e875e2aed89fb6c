//! # TaskQueue: public handle of a bounded-concurrency queue.
//!
//! [`TaskQueue`] is a cheap `Clone` handle. Every clone talks to the same
//! dispatcher task through an unbounded command channel, so `enqueue` never
//! blocks and never waits for the task to run.
//!
//! ## Architecture
//! ```text
//! enqueue(task) / submit(task)
//!     ├─► task.with_defaults(cfg)          (timeout, retries)
//!     ├─► key = next_key++
//!     └─► tx.send(Command::Enqueue)       ──► Dispatcher
//!                                              ├─► publish TaskEnqueued
//!                                              └─► TaskExecutor::run()
//!                                                     └─► reply (submit only)
//!
//! shutdown(grace)
//!     ├─► close()
//!     ├─► wait `finished` up to grace
//!     │     ├─ Ok      → subs.flush(), Ok(())     (dispatcher published QueueDrained)
//!     │     └─ elapsed → publish GraceExceeded
//!     │                  abort.cancel()          → dispatcher drops pending, aborts in-flight
//!     │                  subs.flush()
//!     └─► Err(GraceExceeded { grace, stuck })
//! ```
//!
//! ## Rules
//! - After `close()` returns, every `enqueue` from any clone fails with [`EnqueueError::Closed`]
//! - Dropping every clone closes intake; accepted tasks still run to completion
//! - Task outcomes never reach the `enqueue` caller; use [`TaskQueue::submit`] to observe them
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskqueue::{QueueConfig, Task, TaskError, TaskQueue};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = TaskQueue::new(QueueConfig::default().with_max_concurrency(2))?;
//!
//!     queue.enqueue(Task::new("fire-and-forget", || async { Ok::<_, TaskError>(()) }))?;
//!     let handle = queue.submit(Task::new("answer", || async { Ok::<_, TaskError>(42) }))?;
//!
//!     assert_eq!(handle.await?, 42);
//!     queue.shutdown(Duration::from_secs(1)).await?;
//!     Ok(())
//! }
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot},
    time,
};
use tokio_util::sync::CancellationToken;

use super::{
    builder::QueueBuilder,
    config::QueueConfig,
    dispatcher::{Command, Job},
    executor::{ExecParams, TaskExecutor},
    stats::{Gauges, QueueStats},
    tracker::InFlightTracker,
};
use crate::{
    error::{EnqueueError, QueueError, RuntimeError, TaskError},
    events::{Event, EventKind},
    subscribers::SubscriberSet,
    tasks::{Task, TaskHandle},
};

/// State shared by all clones of a [`TaskQueue`].
pub(crate) struct Shared {
    pub cfg: QueueConfig,
    pub subs: Arc<SubscriberSet>,
    pub gauges: Arc<Gauges>,
    pub tracker: Arc<InFlightTracker>,
    pub next_key: AtomicU64,
    pub closed: AtomicBool,
    /// Cancelled to force the dispatcher to stop.
    pub abort: CancellationToken,
    /// Cancelled by the dispatcher when it exits.
    pub finished: CancellationToken,
}

/// Handle to a bounded-concurrency background task queue.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
}

impl TaskQueue {
    /// Creates a queue with the default [`TracingLogger`](crate::TracingLogger).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(cfg: QueueConfig) -> Result<Self, QueueError> {
        Self::builder(cfg).build()
    }

    /// Returns a builder for a queue with a custom logger or extra subscribers.
    pub fn builder(cfg: QueueConfig) -> QueueBuilder {
        QueueBuilder::new(cfg)
    }

    pub(crate) fn from_parts(tx: mpsc::UnboundedSender<Command>, shared: Arc<Shared>) -> Self {
        Self { tx, shared }
    }

    /// Accepts a task for background execution.
    ///
    /// Returns as soon as the task is handed to the dispatcher. Its outcome is
    /// reported only through events and logs.
    ///
    /// # Errors
    /// - [`EnqueueError::Closed`] if the queue no longer accepts tasks
    /// - [`EnqueueError::InvalidTimeout`] if the task sets a zero timeout
    pub fn enqueue<T: Send + 'static>(&self, task: Task<T>) -> Result<(), EnqueueError> {
        self.push(task, None)
    }

    /// Same as [`enqueue`](Self::enqueue), and returns a handle resolving to the task's final result.
    ///
    /// The handle resolves to the value of the successful attempt, the error of the
    /// last attempt, or [`TaskError::Canceled`] if a forced shutdown dropped the task.
    /// Dropping the handle does not cancel the task.
    pub fn submit<T: Send + 'static>(&self, task: Task<T>) -> Result<TaskHandle<T>, EnqueueError> {
        let (reply, rx) = oneshot::channel();
        let id = task.id_arc();
        self.push(task, Some(reply))?;
        Ok(TaskHandle::new(id, rx))
    }

    fn push<T: Send + 'static>(
        &self,
        task: Task<T>,
        reply: Option<oneshot::Sender<Result<T, TaskError>>>,
    ) -> Result<(), EnqueueError> {
        let id = task.id_arc();
        if self.is_closed() {
            self.reject(&id);
            return Err(EnqueueError::Closed { task: id });
        }
        if task.timeout().is_some_and(|t| t.is_zero()) {
            return Err(EnqueueError::InvalidTimeout { task: id });
        }

        let cfg = &self.shared.cfg;
        let task = task.with_defaults(cfg);
        let params = ExecParams {
            timeout: task.timeout().unwrap_or(cfg.default_timeout),
            max_attempts: task
                .retries()
                .unwrap_or(cfg.default_retries)
                .saturating_add(1),
            backoff: cfg.backoff,
        };
        let key = self.shared.next_key.fetch_add(1, Ordering::Relaxed);

        let executor = TaskExecutor::new(
            key,
            task,
            params,
            Arc::clone(&self.shared.subs),
            Arc::clone(&self.shared.gauges),
        );
        let job = Job {
            key,
            id: Arc::clone(&id),
            run: Box::pin(async move {
                let outcome = executor.run().await;
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }),
        };

        let announce = Event::new(EventKind::TaskEnqueued)
            .with_task(Arc::clone(&id))
            .with_key(key)
            .with_max_attempts(params.max_attempts)
            .with_timeout(params.timeout);

        match self.tx.send(Command::Enqueue { job, announce }) {
            Ok(()) => {
                self.shared.gauges.on_enqueued();
                Ok(())
            }
            Err(_) => {
                self.reject(&id);
                Err(EnqueueError::Closed { task: id })
            }
        }
    }

    fn reject(&self, id: &Arc<str>) {
        self.shared.subs.emit(
            Event::new(EventKind::TaskRejected)
                .with_task(Arc::clone(id))
                .with_error("queue closed"),
        );
    }

    /// Returns a snapshot of the queue counters.
    pub fn stats(&self) -> QueueStats {
        self.shared.gauges.snapshot()
    }

    /// Returns the configuration the queue was built with.
    pub fn config(&self) -> &QueueConfig {
        &self.shared.cfg
    }

    /// Returns `true` once the queue stopped accepting tasks.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire) || self.tx.is_closed()
    }

    /// Stops accepting new tasks. Already accepted tasks run to completion.
    ///
    /// Idempotent.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(Command::Close);
        }
    }

    /// Waits until no task is pending or in flight.
    ///
    /// Tasks enqueued from this clone before the call are included. Returns
    /// immediately once the dispatcher has exited.
    pub async fn wait_idle(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Command::WaitIdle(tx)).is_err() {
            self.shared.finished.cancelled().await;
            return;
        }
        let _ = rx.await;
    }

    /// Closes the queue and waits up to `grace` for accepted tasks to finish.
    ///
    /// Before returning, waits for subscribers to handle every event published so far.
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] if work is still running after `grace`.
    /// Pending tasks are then dropped and in-flight tasks are aborted before returning.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), RuntimeError> {
        self.close();

        if time::timeout(grace, self.shared.finished.cancelled())
            .await
            .is_ok()
        {
            self.shared.subs.flush().await;
            return Ok(());
        }

        let stuck = self.shared.tracker.snapshot().await;
        self.shared.subs.emit(
            Event::new(EventKind::GraceExceeded)
                .with_delay(grace)
                .with_error(stuck.join(", ")),
        );
        self.shared.abort.cancel();
        self.shared.finished.cancelled().await;
        self.shared.subs.flush().await;

        Err(RuntimeError::GraceExceeded { grace, stuck })
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("cfg", &self.shared.cfg)
            .field("closed", &self.is_closed())
            .field("stats", &self.stats())
            .finish()
    }
}
