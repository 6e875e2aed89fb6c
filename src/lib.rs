//! # taskqueue
//!
//! **taskqueue** is a bounded-concurrency background task queue for Tokio.
//!
//! It accepts asynchronous units of work, runs at most `max_concurrency` of them
//! at a time in FIFO order, and applies a per-task timeout and retry-with-backoff
//! policy. A task that keeps failing never blocks the others: once its attempts
//! are spent, its slot goes to the next pending task.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Task<T>    │   │   Task<U>    │   │   Task<V>    │
//!     │  (enqueue)   │   │  (submit)    │   │  (enqueue)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TaskQueue (Clone handle)                                         │
//! │  - fills defaults (timeout, retries), assigns key                 │
//! │  - Command channel (unbounded, never blocks the caller)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (single owner of queue state)                         │
//! │  - pending: VecDeque<Job>          (FIFO)                         │
//! │  - in_flight: JoinSet              (len <= max_concurrency)       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ TaskExecutor │   │ TaskExecutor │   │ TaskExecutor │
//!     │ (retry loop) │   │ (retry loop) │   │ (retry loop) │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ TaskStarting     │ TaskFailed       │ TimeoutHit
//!      │ TaskSucceeded    │ BackoffSched.    │ TaskExhausted
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 SubscriberSet (per-subscriber queues)             │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                         ┌─────────┴─────────┐
//!                         ▼                   ▼
//!                 LogWriter(dyn Logger)   user subscribers
//! ```
//!
//! ### Lifecycle of one task
//! ```text
//! enqueue ──► pending ──dispatch──► in-flight slot
//!
//! loop {
//!   ├─► attempt += 1
//!   ├─► publish TaskStarting{ attempt, max_attempts }
//!   ├─► run_once(task, timeout)
//!   │       ├─ Ok  ──► publish TaskSucceeded, release slot
//!   │       └─ Err ──► publish TaskFailed (+TimeoutHit)
//!   │                  ├─ attempts left & retryable:
//!   │                  │    ├─ delay = backoff.next(attempt)   (50ms × attempt)
//!   │                  │    ├─ publish BackoffScheduled
//!   │                  │    └─ sleep(delay), slot kept
//!   │                  └─ otherwise ─► publish TaskExhausted, release slot
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Queue**         | Bounded FIFO execution, close, idle wait, graceful shutdown.  | [`TaskQueue`], [`QueueBuilder`]            |
//! | **Tasks**         | Async operations with optional timeout / retries overrides.   | [`Task`], [`TaskHandle`]                   |
//! | **Policies**      | Delay between attempts.                                       | [`BackoffPolicy`], [`JitterPolicy`]        |
//! | **Observers**     | Lifecycle events, pluggable logger.                           | [`Subscribe`], [`Logger`], [`Event`]       |
//! | **Errors**        | Typed errors for tasks, intake and shutdown.                  | [`TaskError`], [`EnqueueError`]            |
//! | **Configuration** | Concurrency, default timeout, default retries, backoff.      | [`QueueConfig`]                            |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskqueue::{QueueConfig, Task, TaskError, TaskQueue};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = QueueConfig::default()
//!         .with_max_concurrency(2)
//!         .with_default_timeout(Duration::from_secs(5));
//!     let queue = TaskQueue::new(cfg)?;
//!
//!     for i in 0..4 {
//!         queue.enqueue(Task::new(format!("job-{i}"), move || async move {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!             Ok::<_, TaskError>(i)
//!         }))?;
//!     }
//!
//!     queue.wait_idle().await;
//!     assert_eq!(queue.stats().succeeded, 4);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{QueueBuilder, QueueConfig, QueueStats, TaskQueue};
pub use error::{EnqueueError, QueueError, RuntimeError, TaskError};
pub use events::{Event, EventKind};
pub use policies::{BackoffPolicy, Growth, JitterPolicy};
pub use subscribers::{LogWriter, Logger, Subscribe, SubscriberSet, TracingLogger};
pub use tasks::{BoxTaskFuture, Task, TaskHandle};
