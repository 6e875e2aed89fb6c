//! # TaskExecutor: retry loop of one task.
//!
//! Drives a single [`Task`] from its first attempt to a terminal outcome:
//! - per-attempt timeout,
//! - up to `retries + 1` attempts,
//! - delay between attempts per [`BackoffPolicy`].
//!
//! ## Event flow
//! For each attempt the executor publishes:
//! ```text
//! TaskStarting → [run_once] → TaskSucceeded                       (done)
//!                           → TaskFailed (+TimeoutHit)
//!                                 ├─ attempts left & retryable → BackoffScheduled → [sleep] → next attempt
//!                                 └─ otherwise                 → TaskExhausted    (done)
//! ```
//!
//! ## State machine
//! ```text
//! Pending ──dispatch──► Running(k) ──ok──────────────────────────► Succeeded
//!                           │
//!                           ├──err, k < max, retryable──► Retrying(k+1) ──backoff──► Running(k+1)
//!                           └──err, k == max or fatal───► FailedTerminal
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** inside the slot the task was dispatched to
//! - Timer, attempt counter and backoff are local to this executor
//! - Errors never escape: the outcome is returned to the dispatcher's job wrapper,
//!   which forwards it to a [`TaskHandle`](crate::TaskHandle) or drops it

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::{
    core::{
        runner::{AttemptInfo, run_once},
        stats::Gauges,
    },
    error::TaskError,
    events::{Event, EventKind},
    policies::BackoffPolicy,
    subscribers::SubscriberSet,
    tasks::Task,
};

/// Resolved execution parameters of one task.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ExecParams {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// `retries + 1`.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub backoff: BackoffPolicy,
}

/// Runs one task through its attempts.
pub(crate) struct TaskExecutor<T> {
    key: u64,
    task: Task<T>,
    params: ExecParams,
    subs: Arc<SubscriberSet>,
    gauges: Arc<Gauges>,
}

impl<T: Send + 'static> TaskExecutor<T> {
    pub fn new(
        key: u64,
        task: Task<T>,
        params: ExecParams,
        subs: Arc<SubscriberSet>,
        gauges: Arc<Gauges>,
    ) -> Self {
        Self {
            key,
            task,
            params,
            subs,
            gauges,
        }
    }

    /// Runs attempts until success, a non-retryable error, or the attempt budget is spent.
    ///
    /// Returns the value of the successful attempt or the error of the last one.
    pub async fn run(self) -> Result<T, TaskError> {
        let max_attempts = self.params.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let info = AttemptInfo {
                key: self.key,
                attempt,
                max_attempts,
            };
            self.publish(EventKind::TaskStarting, info);

            match run_once(&self.task, self.params.timeout, info, &self.subs).await {
                Ok(value) => {
                    self.publish(EventKind::TaskSucceeded, info);
                    self.gauges.on_succeeded();
                    return Ok(value);
                }
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    let delay = self.params.backoff.next(attempt);
                    self.subs.emit(
                        self.event(EventKind::BackoffScheduled, info)
                            .with_delay(delay)
                            .with_error(e.to_string()),
                    );
                    time::sleep(delay).await;
                }
                Err(e) => {
                    self.subs.emit(
                        self.event(EventKind::TaskExhausted, info)
                            .with_error(e.to_string()),
                    );
                    self.gauges.on_failed();
                    return Err(e);
                }
            }
        }
    }

    fn event(&self, kind: EventKind, info: AttemptInfo) -> Event {
        Event::new(kind)
            .with_task(self.task.id_arc())
            .with_key(info.key)
            .with_attempt(info.attempt, info.max_attempts)
    }

    fn publish(&self, kind: EventKind, info: AttemptInfo) {
        self.subs.emit(self.event(kind, info));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::runtime::Handle;

    fn executor<T: Send + 'static>(
        task: Task<T>,
        retries: u32,
        gauges: Arc<Gauges>,
    ) -> TaskExecutor<T> {
        let params = ExecParams {
            timeout: Duration::from_millis(100),
            max_attempts: retries + 1,
            backoff: BackoffPolicy::default(),
        };
        let subs = Arc::new(SubscriberSet::new(Vec::new(), &Handle::current()));
        TaskExecutor::new(1, task, params, subs, gauges)
    }

    fn flaky(fail_times: u32, calls: Arc<AtomicU32>) -> Task<u32> {
        Task::new("flaky", move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= fail_times {
                    Err(TaskError::fail(format!("boom #{n}")))
                } else {
                    Ok(n)
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_last_allowed_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let gauges = Arc::new(Gauges::default());
        let res = executor(flaky(2, calls.clone()), 2, gauges.clone()).run().await;

        assert_eq!(res.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(gauges.snapshot().succeeded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let gauges = Arc::new(Gauges::default());
        let res = executor(flaky(10, calls.clone()), 2, gauges.clone()).run().await;

        match res {
            Err(TaskError::Fail { error }) => assert_eq!(error, "boom #3"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(gauges.snapshot().failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn linear_backoff_between_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = time::Instant::now();
        let res = executor(flaky(3, calls), 3, Arc::new(Gauges::default())).run().await;

        assert!(res.is_ok());
        // 50ms + 100ms + 150ms of backoff, operations complete instantly.
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_attempts_are_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let task = Task::new("shaky", move || {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    panic!("transient bug #{n}");
                }
                Ok::<_, TaskError>(n)
            }
        });
        let gauges = Arc::new(Gauges::default());
        let res = executor(task, 2, gauges.clone()).run().await;

        assert_eq!(res.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(gauges.snapshot().failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_skips_remaining_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let task = Task::new("fatal", move || {
            c.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(TaskError::fatal("bad input")) }
        });
        let res = executor(task, 5, Arc::new(Gauges::default())).run().await;

        assert!(matches!(res, Err(TaskError::Fatal { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
