//! # Example: basic_queue
//!
//! Four 50ms jobs on a queue with two slots.
//!
//! Demonstrates how to:
//! - Build a [`TaskQueue`] with a custom [`QueueConfig`].
//! - Fire-and-forget tasks with [`TaskQueue::enqueue`].
//! - Observe progress through `tracing` records.
//!
//! ## Flow
//! ```text
//! t=0ms    A, B start          (C, D pending)
//! t=50ms   A, B done → C, D start
//! t=100ms  C, D done → queue idle
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=taskqueue=trace cargo run --example basic_queue
//! ```

use std::time::{Duration, Instant};

use taskqueue::{QueueConfig, Task, TaskError, TaskQueue};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .init();

    // 1. Two slots, defaults for everything else
    let cfg = QueueConfig::default().with_max_concurrency(2);
    let queue = TaskQueue::new(cfg)?;
    let started = Instant::now();

    // 2. Enqueue four jobs; enqueue returns immediately
    for name in ["A", "B", "C", "D"] {
        queue.enqueue(Task::new(name, move || async move {
            println!("[{name}] start at {:?}", started.elapsed());
            tokio::time::sleep(Duration::from_millis(50)).await;
            println!("[{name}] done at {:?}", started.elapsed());
            Ok::<_, TaskError>(())
        }))?;
    }

    // 3. Drain
    queue.shutdown(Duration::from_secs(1)).await?;
    println!("[main] {:?} in {:?}", queue.stats(), started.elapsed());
    Ok(())
}
