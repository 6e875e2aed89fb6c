//! # Example: retry_with_backoff
//!
//! Demonstrates how the queue retries failed attempts according to
//! [`BackoffPolicy`], and how a task that keeps failing does not block others.
//!
//! ## Flow
//! ```text
//! flaky:
//!   ├─► attempt 1 → Err("boom #1") → BackoffScheduled{delay=100ms}
//!   ├─► attempt 2 → Err("boom #2") → BackoffScheduled{delay=200ms}
//!   └─► attempt 3 → Ok
//! hopeless:
//!   ├─► attempts 1..=3 fail
//!   └─► TaskExhausted (error-level log), slot released
//! slow:
//!   └─► attempt 1 exceeds its 300ms timeout → TimeoutHit, retries 0 → TaskExhausted
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=taskqueue=trace cargo run --example retry_with_backoff
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use taskqueue::{
    BackoffPolicy, Event, EventKind, Growth, JitterPolicy, QueueConfig, Subscribe, Task,
    TaskError, TaskQueue,
};
use tracing_subscriber::EnvFilter;

/// Prints retry decisions next to the regular log output.
struct RetryPrinter;

#[async_trait]
impl Subscribe for RetryPrinter {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::BackoffScheduled => println!(
                "[sub] retry:     task={} after attempt {}/{} in {}ms",
                ev.task.as_deref().unwrap_or("<unknown>"),
                ev.attempt.unwrap_or(0),
                ev.max_attempts.unwrap_or(0),
                ev.delay_ms.unwrap_or(0)
            ),
            EventKind::TaskExhausted => println!(
                "[sub] exhausted: task={} error={}",
                ev.task.as_deref().unwrap_or("<unknown>"),
                ev.error.as_deref().unwrap_or("<none>")
            ),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "retry-printer"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // 1. Exponential backoff: 100ms, 200ms, 400ms ... capped at 2s
    let backoff = BackoffPolicy {
        step: Duration::from_millis(100),
        max: Duration::from_secs(2),
        growth: Growth::Exponential { factor: 2.0 },
        jitter: JitterPolicy::None,
    };
    let cfg = QueueConfig::default()
        .with_max_concurrency(2)
        .with_backoff(backoff);

    let queue = TaskQueue::builder(cfg)
        .with_subscribers(vec![Arc::new(RetryPrinter) as Arc<dyn Subscribe>])
        .build()?;

    // 2. Fails twice, then succeeds
    let calls = Arc::new(AtomicU32::new(0));
    let flaky = queue.submit(Task::new("flaky", move || {
        let attempt = calls.fetch_add(1, Ordering::Relaxed) + 1;
        async move {
            if attempt <= 2 {
                Err(TaskError::fail(format!("boom #{attempt}")))
            } else {
                Ok(attempt)
            }
        }
    }))?;

    // 3. Never succeeds
    queue.enqueue(Task::new("hopeless", || async {
        Err::<(), _>(anyhow::anyhow!("upstream unavailable"))
    }))?;

    // 4. Too slow for its own timeout, no retries
    queue.enqueue(
        Task::new("slow", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, TaskError>(())
        })
        .with_timeout(Duration::from_millis(300))
        .with_retries(0),
    )?;

    println!("[main] flaky finished after {} attempts", flaky.await?);
    queue.shutdown(Duration::from_secs(5)).await?;
    println!("[main] {:?}", queue.stats());
    Ok(())
}
