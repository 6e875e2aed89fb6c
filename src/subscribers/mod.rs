//! # Observers of the queue.
//!
//! The queue reports everything it does as [`Event`](crate::Event)s. This module
//! provides the hook for consuming them and the built-in logging consumer.
//!
//! ## Architecture
//! ```text
//! TaskQueue / Dispatcher / TaskExecutor ── emit(Event) ──► SubscriberSet
//!                                                               │
//!                                           ┌───────────────────┼──────────────┐
//!                                           ▼                   ▼              ▼
//!                                 LogWriter(dyn Logger)     user sub 1 ...  user sub N
//!                                           │
//!                                           ▼
//!                                 TracingLogger → tracing::{trace,warn,error}!
//! ```
//!
//! ## Contents
//! - [`Subscribe`] extension point for custom observers
//! - [`SubscriberSet`] non-blocking fan-out with per-subscriber queues
//! - [`Logger`] minimal `{trace, warn, error}` capability, [`TracingLogger`] default
//! - [`LogWriter`] subscriber mapping events to logger calls

mod log;
mod logger;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use logger::{Logger, TracingLogger};
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
