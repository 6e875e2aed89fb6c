//! # TaskHandle: opt-in result channel.
//!
//! Returned by [`TaskQueue::submit`](crate::TaskQueue::submit). It is a future
//! resolving to the task's final outcome: the value of the first successful
//! attempt, or the error of the last attempt. A task dropped by a forced
//! shutdown resolves to [`TaskError::Canceled`].
//!
//! Dropping the handle does not cancel the task.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::TaskError;

/// Future of a submitted task's final outcome.
#[derive(Debug)]
pub struct TaskHandle<T> {
    id: Arc<str>,
    rx: oneshot::Receiver<Result<T, TaskError>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: Arc<str>, rx: oneshot::Receiver<Result<T, TaskError>>) -> Self {
        Self { id, rx }
    }

    /// Returns the id of the submitted task.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(TaskError::Canceled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_to_sent_outcome() {
        let (tx, rx) = oneshot::channel();
        let handle = TaskHandle::new("t".into(), rx);
        tx.send(Ok::<_, TaskError>(5)).unwrap();
        assert_eq!(handle.await.unwrap(), 5);
    }

    #[tokio::test]
    async fn dropped_sender_is_canceled() {
        let (tx, rx) = oneshot::channel::<Result<(), TaskError>>();
        let handle = TaskHandle::new("t".into(), rx);
        drop(tx);
        assert!(matches!(handle.await, Err(TaskError::Canceled)));
    }
}
