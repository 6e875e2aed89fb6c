//! Retry delay policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (step / growth / max + jitter)
//! - [`Growth`] linear or exponential scaling with the attempt number
//! - [`JitterPolicy`] randomization strategy to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! QueueConfig { backoff: BackoffPolicy, .. }
//!      └─► core::executor::TaskExecutor uses backoff.next(attempt)
//!          after every retryable failure that still has attempts left
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → step=50ms, linear, max=30s, jitter=None.

mod backoff;
mod jitter;

pub use backoff::{BackoffPolicy, Growth};
pub use jitter::JitterPolicy;
