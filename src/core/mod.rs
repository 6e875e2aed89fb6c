//! Queue core: intake, dispatch and execution.
//!
//! The only public API from this module is [`TaskQueue`] (with its
//! [`QueueBuilder`], [`QueueConfig`] and [`QueueStats`]).
//!
//! Internal modules:
//! - [`dispatcher`]: single owner of the pending list and the in-flight slots;
//! - [`executor`]: runs a single task through its attempts with backoff;
//! - [`runner`]: executes one attempt with timeout and panic capture;
//! - [`tracker`]: ids of in-flight tasks for shutdown reports;
//! - [`stats`]: counters behind [`TaskQueue::stats`].

mod builder;
mod config;
mod dispatcher;
mod executor;
mod queue;
mod runner;
mod stats;
mod tracker;

pub use builder::QueueBuilder;
pub use config::QueueConfig;
pub use queue::TaskQueue;
pub use stats::QueueStats;
