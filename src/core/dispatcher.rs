//! # Dispatcher: owner of the pending list and the in-flight slots.
//!
//! A single Tokio task that is the **only** mutator of the queue state. Handles
//! send it [`Command`]s over an unbounded channel; executions report back through
//! a [`JoinSet`]. Because every mutation happens inside this one loop, repeated
//! triggers (many completions in the same tick, bursts of enqueues) can never
//! double-dispatch a job or exceed the concurrency limit.
//!
//! ## Architecture
//! ```text
//! TaskQueue ──Command──► rx ─┐
//!                            ▼
//! loop {                 select!
//!   ├─► abort cancelled           → break (forced shutdown)
//!   ├─► in_flight.join_next()     → release slot
//!   ├─► rx.recv()                 → Enqueue: publish TaskEnqueued, pending.push_back
//!   │                               WaitIdle: register waiter
//!   │                               Close: stop intake, keep draining
//!   ├─► dispatch(): while in_flight < max && pending non-empty:
//!   │        pending.pop_front() → in_flight.spawn(job)
//!   ├─► wake idle waiters if nothing is pending or in flight
//!   └─► exit once intake is closed and both collections are empty
//! }
//! ```
//!
//! ## Rules
//! - Pending jobs start strictly in FIFO order
//! - `in_flight.len() <= max_concurrency` after every step
//! - A job stays in its slot for all of its attempts, including backoff sleeps
//! - Every completion path (success, terminal failure, panic) releases the slot
//!   and re-runs `dispatch()`

use std::collections::VecDeque;
use std::sync::Arc;

use futures::{FutureExt, future::BoxFuture};
use tokio::{
    sync::{mpsc, oneshot},
    task::{JoinError, JoinSet},
};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{stats::Gauges, tracker::InFlightTracker},
    events::{Event, EventKind},
    subscribers::{SubscriberSet, panic_message},
};

/// A type-erased task ready to run: the executor future plus its identity.
pub(crate) struct Job {
    pub key: u64,
    pub id: Arc<str>,
    pub run: BoxFuture<'static, ()>,
}

/// Messages from queue handles to the dispatcher.
pub(crate) enum Command {
    /// Append a job to the pending list and publish its `TaskEnqueued` event.
    Enqueue { job: Job, announce: Event },
    /// Resolve the sender once nothing is pending or in flight.
    WaitIdle(oneshot::Sender<()>),
    /// Stop accepting commands; accepted jobs still run.
    Close,
}

pub(crate) struct Dispatcher {
    max_concurrency: usize,
    rx: mpsc::UnboundedReceiver<Command>,
    intake_open: bool,
    pending: VecDeque<Job>,
    in_flight: JoinSet<u64>,
    idle_waiters: Vec<oneshot::Sender<()>>,
    tracker: Arc<InFlightTracker>,
    gauges: Arc<Gauges>,
    subs: Arc<SubscriberSet>,
}

impl Dispatcher {
    pub fn new(
        max_concurrency: usize,
        rx: mpsc::UnboundedReceiver<Command>,
        tracker: Arc<InFlightTracker>,
        gauges: Arc<Gauges>,
        subs: Arc<SubscriberSet>,
    ) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            rx,
            intake_open: true,
            pending: VecDeque::new(),
            in_flight: JoinSet::new(),
            idle_waiters: Vec::new(),
            tracker,
            gauges,
            subs,
        }
    }

    /// Runs until intake is closed and all accepted jobs are done, or until `abort` fires.
    ///
    /// On abort, pending jobs are dropped and in-flight jobs are cancelled.
    pub async fn run(mut self, abort: CancellationToken) {
        let mut aborted = false;

        loop {
            tokio::select! {
                biased;
                _ = abort.cancelled() => {
                    aborted = true;
                    break;
                }
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.on_settled(joined).await;
                }
                cmd = self.rx.recv(), if self.intake_open => match cmd {
                    Some(cmd) => self.on_command(cmd),
                    None => {
                        self.intake_open = false;
                        self.subs.emit(Event::new(EventKind::QueueClosed));
                    }
                },
            }

            self.dispatch().await;
            self.notify_idle();

            if !self.intake_open && self.is_idle() {
                break;
            }
        }

        if aborted {
            self.pending.clear();
            self.in_flight.shutdown().await;
        } else {
            self.subs.emit(Event::new(EventKind::QueueDrained));
        }
        self.gauges.set_occupancy(0, 0);
    }

    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Enqueue { job, announce } => {
                self.subs.emit(announce);
                self.pending.push_back(job);
            }
            Command::WaitIdle(waiter) => self.idle_waiters.push(waiter),
            Command::Close => self.rx.close(),
        }
    }

    /// Releases the slot of a finished job.
    async fn on_settled(&mut self, joined: Result<u64, JoinError>) {
        match joined {
            Ok(key) => {
                self.tracker.remove(key).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "in-flight job terminated abnormally");
            }
        }
    }

    /// Fills free slots from the head of the pending list.
    async fn dispatch(&mut self) {
        while self.in_flight.len() < self.max_concurrency {
            let Some(Job { key, id, run }) = self.pending.pop_front() else {
                break;
            };
            self.tracker.insert(key, Arc::clone(&id)).await;

            self.in_flight.spawn(async move {
                if let Err(panic_err) = std::panic::AssertUnwindSafe(run).catch_unwind().await {
                    tracing::error!(
                        task = %id,
                        key,
                        info = %panic_message(&*panic_err),
                        "task job panicked"
                    );
                }
                key
            });
        }
        self.gauges
            .set_occupancy(self.pending.len(), self.in_flight.len());
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }

    fn notify_idle(&mut self) {
        if !self.is_idle() {
            return;
        }
        for waiter in self.idle_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }
}
