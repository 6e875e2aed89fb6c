//! # Queue counters.
//!
//! [`Gauges`] is shared between the queue handle, the dispatcher and the executors.
//! Counters are updated with relaxed atomics; [`QueueStats`] is a point-in-time
//! snapshot and fields may be observed at slightly different instants.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Snapshot of the queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks accepted since creation.
    pub enqueued: u64,
    /// Tasks waiting for a slot.
    pub pending: usize,
    /// Tasks currently occupying a slot (including backoff waits).
    pub in_flight: usize,
    /// Highest `in_flight` value observed.
    pub peak_in_flight: usize,
    /// Tasks that finished with a successful attempt.
    pub succeeded: u64,
    /// Tasks that finished with a terminal failure.
    pub failed: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Gauges {
    enqueued: AtomicU64,
    pending: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl Gauges {
    pub fn on_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Dispatcher view of its own collections.
    pub fn set_occupancy(&self, pending: usize, in_flight: usize) {
        self.pending.store(pending, Ordering::Relaxed);
        self.in_flight.store(in_flight, Ordering::Relaxed);
        self.peak_in_flight.fetch_max(in_flight, Ordering::Relaxed);
    }

    pub fn on_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> QueueStats {
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            pending: self.pending.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            peak_in_flight: self.peak_in_flight.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
