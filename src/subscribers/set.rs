//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which distributes events to every subscriber
//! without blocking the publisher (enqueue callers, the dispatcher, executors).
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → tracing::error!
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: event dropped for that subscriber only, a warning is logged
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in emission order
//! - **Flush**: `flush()` waits until every worker handled what was emitted before the call
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot},
};

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Items carried by a subscriber queue.
enum Message {
    Event(Arc<Event>),
    /// Acknowledged once everything queued before it was handled.
    Flush(oneshot::Sender<()>),
}

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Message>,
}

/// Fan-out coordinator for multiple event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber on `rt`.
    ///
    /// Minimum queue capacity is 1.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, rt: &Handle) -> Self {
        let mut channels = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Message>(cap);

            rt.spawn(async move {
                while let Some(msg) = rx.recv().await {
                    let ev = match msg {
                        Message::Event(ev) => ev,
                        Message::Flush(ack) => {
                            let _ = ack.send(());
                            continue;
                        }
                    };
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        tracing::error!(
                            subscriber = sub.name(),
                            info = %panic_message(&*panic_err),
                            "subscriber panicked"
                        );
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
        }
        Self { channels }
    }

    /// Emits an event to all subscribers (non-blocking).
    pub fn emit(&self, event: Event) {
        let event = Arc::new(event);
        for channel in &self.channels {
            match channel.sender.try_send(Message::Event(Arc::clone(&event))) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        subscriber = channel.name,
                        seq = event.seq,
                        "subscriber queue full; event dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!(
                        subscriber = channel.name,
                        seq = event.seq,
                        "subscriber worker closed; event dropped"
                    );
                }
            }
        }
    }

    /// Waits until every subscriber has handled the events emitted before this call.
    ///
    /// Unlike `emit`, this waits for queue space. Workers that already stopped are skipped.
    pub async fn flush(&self) {
        let mut acks = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let (ack, done) = oneshot::channel();
            if channel.sender.send(Message::Flush(ack)).await.is_ok() {
                acks.push(done);
            }
        }
        for done in acks {
            let _ = done.await;
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }
    }

    struct Exploding;

    #[async_trait]
    impl Subscribe for Exploding {
        async fn on_event(&self, _event: &Event) {
            panic!("subscriber bug");
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_isolates_panics() {
        let rec = Arc::new(Recorder::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Exploding), rec.clone()];
        let set = SubscriberSet::new(subs, &Handle::current());

        set.emit(Event::new(EventKind::TaskEnqueued));
        set.emit(Event::new(EventKind::TaskStarting));
        set.emit(Event::new(EventKind::TaskSucceeded));
        set.flush().await;

        assert_eq!(
            *rec.0.lock().unwrap(),
            vec![
                EventKind::TaskEnqueued,
                EventKind::TaskStarting,
                EventKind::TaskSucceeded
            ]
        );
    }

    #[tokio::test]
    async fn flush_waits_for_slow_subscribers() {
        struct Slow(Mutex<u32>);

        #[async_trait]
        impl Subscribe for Slow {
            async fn on_event(&self, _event: &Event) {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                *self.0.lock().unwrap() += 1;
            }
        }

        let slow = Arc::new(Slow(Mutex::new(0)));
        let set = SubscriberSet::new(vec![slow.clone() as Arc<dyn Subscribe>], &Handle::current());
        for _ in 0..3 {
            set.emit(Event::new(EventKind::TaskFailed));
        }
        set.flush().await;
        assert_eq!(*slow.0.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn flush_without_subscribers_returns() {
        SubscriberSet::new(Vec::new(), &Handle::current()).flush().await;
    }

    #[test]
    fn panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
