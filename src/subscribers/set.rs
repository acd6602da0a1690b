//! # Non-blocking fan-out over multiple subscribers.
//!
//! [`SubscriberSet`] hands every [`Event`] to each subscriber's bounded
//! queue and returns immediately; one worker task per subscriber drains its
//! queue in FIFO order.
//!
//! ```text
//!    fan_out(&Event)
//!        ├──────────► [queue A] ──► worker A ──► a.handle()
//!        ├──────────► [queue B] ──► worker B ──► b.handle()
//!        └──────────► [queue N] ──► worker N ──► n.handle()
//! ```
//!
//! Guarantees: non-blocking emission, per-subscriber FIFO, panic isolation.
//! Not guaranteed: global ordering across subscribers, delivery on queue
//! overflow (the event is dropped for that subscriber and a warning goes to
//! stderr).

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;
use crate::subscribers::Subscriber;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker task per subscriber.
    ///
    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscriber>>) -> Self {
        let mut lanes = Vec::with_capacity(subscribers.len());
        let mut workers = Vec::with_capacity(subscribers.len());

        for sub in subscribers {
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                tx,
            });
            workers.push(tokio::spawn(Self::drain(sub, rx)));
        }

        Self { lanes, workers }
    }

    async fn drain(sub: Arc<dyn Subscriber>, mut rx: mpsc::Receiver<Arc<Event>>) {
        while let Some(ev) = rx.recv().await {
            let fut = sub.handle(ev.as_ref());
            if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                eprintln!(
                    "[stepvisor] subscriber '{}' panicked: {panic:?}",
                    sub.name()
                );
            }
        }
    }

    /// Hands one event to every subscriber queue (non-blocking).
    ///
    /// A full or closed queue drops the event for that subscriber only.
    pub fn fan_out(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for lane in &self.lanes {
            if let Err(err) = lane.tx.try_send(Arc::clone(&ev)) {
                let why = match err {
                    mpsc::error::TrySendError::Full(_) => "queue full",
                    mpsc::error::TrySendError::Closed(_) => "worker closed",
                };
                eprintln!("[stepvisor] subscriber '{}' dropped event: {why}", lane.name);
            }
        }
    }

    /// Closes all queues and waits for the workers to finish draining.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl Subscriber for Counter {
        async fn handle(&self, _event: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    #[tokio::test]
    async fn test_fan_out_reaches_every_subscriber() {
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        let set = SubscriberSet::new(vec![
            Arc::new(Counter(Arc::clone(&a))),
            Arc::new(Counter(Arc::clone(&b))),
        ]);

        for _ in 0..3 {
            set.fan_out(&Event::now(EventKind::StatusMessage).with_text("tick"));
        }
        set.shutdown().await;

        assert_eq!(a.load(Ordering::SeqCst), 3);
        assert_eq!(b.load(Ordering::SeqCst), 3);
    }

    struct Panicky;

    #[async_trait]
    impl Subscriber for Panicky {
        async fn handle(&self, _event: &Event) {
            panic!("subscriber defect");
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_break_others() {
        let seen = Arc::new(AtomicUsize::new(0));
        let set = SubscriberSet::new(vec![
            Arc::new(Panicky),
            Arc::new(Counter(Arc::clone(&seen))),
        ]);

        set.fan_out(&Event::now(EventKind::Started));
        set.fan_out(&Event::now(EventKind::Stopped));
        set.shutdown().await;

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
