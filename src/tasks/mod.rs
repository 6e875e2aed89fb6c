//! # Task abstractions.
//!
//! - [`Task`] an id, an async operation and optional timeout / retry overrides
//! - [`TaskHandle`] future of a submitted task's final outcome
//! - [`BoxTaskFuture`] boxed future of one attempt

mod handle;
mod task;

pub use handle::TaskHandle;
pub use task::{BoxTaskFuture, Task};
