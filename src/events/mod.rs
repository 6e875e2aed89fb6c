//! Queue events.
//!
//! This module groups the event **data model** emitted by the queue handle,
//! the dispatcher and the task executors. Events are delivered to observers
//! through [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publishers**: `TaskQueue` (enqueue/close/shutdown), `Dispatcher`,
//!   `TaskExecutor` and `runner::run_once`.
//! - **Consumers**: the built-in [`LogWriter`](crate::LogWriter) and user subscribers.

mod event;

pub use event::{Event, EventKind};
