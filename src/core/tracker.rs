//! # In-flight task tracker.
//!
//! Records which tasks currently occupy a concurrency slot so that a shutdown
//! that runs out of grace can report the stuck ones.
//!
//! ## Architecture
//! ```text
//! Dispatcher::dispatch()  ──► InFlightTracker::insert(key, id)
//! Dispatcher::on_settled() ──► InFlightTracker::remove(key)
//! TaskQueue::shutdown()   ──► InFlightTracker::snapshot()   (on GraceExceeded)
//! ```
//!
//! ## Rules
//! - Keyed by the internal task key, so tasks sharing an id are tracked separately
//! - `snapshot` returns ids in key order, i.e. the order keys were assigned at enqueue
//! - Reads are **eventually consistent** with the dispatcher

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Thread-safe set of in-flight tasks.
#[derive(Default)]
pub(crate) struct InFlightTracker {
    running: RwLock<BTreeMap<u64, Arc<str>>>,
}

impl InFlightTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a task as occupying a slot.
    pub async fn insert(&self, key: u64, id: Arc<str>) {
        self.running.write().await.insert(key, id);
    }

    /// Marks a task's slot as released.
    pub async fn remove(&self, key: u64) -> bool {
        self.running.write().await.remove(&key).is_some()
    }

    /// Returns ids of in-flight tasks in key order.
    pub async fn snapshot(&self) -> Vec<String> {
        self.running
            .read()
            .await
            .values()
            .map(|id| id.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_in_dispatch_order() {
        let t = InFlightTracker::new();
        t.insert(7, "late".into()).await;
        t.insert(2, "early".into()).await;
        t.insert(5, "early".into()).await;
        assert_eq!(t.snapshot().await, vec!["early", "early", "late"]);

        assert!(t.remove(2).await);
        assert!(!t.remove(2).await);
        assert_eq!(t.snapshot().await, vec!["early", "late"]);
    }
}
