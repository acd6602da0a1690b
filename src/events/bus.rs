//! # Broadcast bus for supervisor events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] connecting
//! the worker (publisher) to any number of consumers: the supervisor's
//! subscriber fan-out and ad-hoc receivers obtained through
//! [`Supervisor::subscribe`](crate::Supervisor::subscribe).
//!
//! - [`Bus::publish`] never blocks and never fails from the publisher's
//!   point of view; with no receivers the event is simply dropped.
//! - [`Bus::subscribe`] creates an independent receiver that observes every
//!   event published after the call.
//!
//! A receiver that falls more than the bus capacity behind loses the oldest
//! events (broadcast lag); consumers that must not miss events should drain
//! promptly or hand off to their own queue.

use tokio::sync::broadcast;

use crate::events::Event;

/// Broadcast channel for supervisor events.
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    ///
    /// The no-receiver case is not an error; the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Subscribes to the bus and returns a new receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
