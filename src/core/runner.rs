//! # Run a single attempt of a task.
//!
//! Executes one attempt of a [`Task`] under its timeout and reports the result
//! to the [`SubscriberSet`].
//!
//! ## Event flow
//! ```text
//! Success:
//!   task.spawn() → Ok(v)            → (no event; the executor publishes TaskSucceeded)
//!
//! Failure:
//!   task.spawn() → Err(Fail/Fatal)  → publish TaskFailed
//!
//! Panic:
//!   task.spawn() panics             → publish TaskFailed (Panicked)
//!
//! Timeout:
//!   timer fires first → drop operation future → publish TimeoutHit
//!                                             → publish TaskFailed (Timeout)
//! ```
//!
//! ## Rules
//! - The operation and the timer race; the loser is dropped, never awaited further
//! - When the operation wins, the timer is dropped with the `Timeout` future
//! - `TimeoutHit` is published **in addition to** `TaskFailed` on timeout

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;

use crate::{
    error::TaskError,
    events::{Event, EventKind},
    subscribers::{SubscriberSet, panic_message},
    tasks::Task,
};

/// Identity of the attempt being run, for event metadata.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AttemptInfo {
    pub key: u64,
    pub attempt: u32,
    pub max_attempts: u32,
}

/// Executes a single attempt of `task`, publishing failure events to `subs`.
pub(crate) async fn run_once<T: Send + 'static>(
    task: &Task<T>,
    timeout: Duration,
    info: AttemptInfo,
    subs: &SubscriberSet,
) -> Result<T, TaskError> {
    // The closure itself runs inside the guard so a panic while building the future is caught too.
    let attempt = std::panic::AssertUnwindSafe(async { task.spawn().await }).catch_unwind();

    let res = match time::timeout(timeout, attempt).await {
        Ok(Ok(res)) => res,
        Ok(Err(panic_err)) => Err(TaskError::Panicked {
            info: panic_message(&*panic_err),
        }),
        Err(_elapsed) => {
            publish_timeout(subs, task.id_arc(), timeout, info);
            Err(TaskError::Timeout {
                task: task.id_arc(),
                timeout,
            })
        }
    };

    if let Err(e) = &res {
        publish_failed(subs, task.id_arc(), info, e);
    }
    res
}

/// Publishes `TaskFailed` event with error details.
fn publish_failed(subs: &SubscriberSet, id: Arc<str>, info: AttemptInfo, err: &TaskError) {
    subs.emit(
        Event::new(EventKind::TaskFailed)
            .with_task(id)
            .with_key(info.key)
            .with_attempt(info.attempt, info.max_attempts)
            .with_error(err.to_string()),
    );
}

/// Publishes `TimeoutHit` event (always followed by `TaskFailed`).
fn publish_timeout(subs: &SubscriberSet, id: Arc<str>, dur: Duration, info: AttemptInfo) {
    subs.emit(
        Event::new(EventKind::TimeoutHit)
            .with_task(id)
            .with_key(info.key)
            .with_attempt(info.attempt, info.max_attempts)
            .with_timeout(dur),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::Handle;

    fn info() -> AttemptInfo {
        AttemptInfo {
            key: 1,
            attempt: 1,
            max_attempts: 1,
        }
    }

    fn no_subs() -> SubscriberSet {
        SubscriberSet::new(Vec::new(), &Handle::current())
    }

    #[tokio::test]
    async fn returns_value_before_timeout() {
        let task = Task::new("ok", || async { Ok::<_, TaskError>("done") });
        let res = run_once(&task, Duration::from_secs(1), info(), &no_subs()).await;
        assert_eq!(res.unwrap(), "done");
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_pending_operation() {
        let task = Task::new("stuck", || futures::future::pending::<Result<(), TaskError>>());
        let started = time::Instant::now();
        let res = run_once(&task, Duration::from_millis(200), info(), &no_subs()).await;

        assert_eq!(started.elapsed(), Duration::from_millis(200));
        match res {
            Err(TaskError::Timeout { task, timeout }) => {
                assert_eq!(&*task, "stuck");
                assert_eq!(timeout, Duration::from_millis(200));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn captures_panics_raised_before_the_first_poll() {
        let task: Task<()> = Task::new("eager", || -> std::future::Ready<Result<(), TaskError>> {
            panic!("closure bug")
        });
        let res = run_once(&task, Duration::from_secs(1), info(), &no_subs()).await;
        match res {
            Err(TaskError::Panicked { info }) => assert_eq!(info, "closure bug"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn captures_panics() {
        let task = Task::new("panics", || async {
            if true {
                panic!("operation bug");
            }
            Ok::<(), TaskError>(())
        });
        let res = run_once(&task, Duration::from_secs(1), info(), &no_subs()).await;
        match res {
            Err(TaskError::Panicked { info }) => assert_eq!(info, "operation bug"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
