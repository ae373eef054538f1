//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that gives
//! the scheduler a non-blocking way to publish lifecycle events, and gives
//! observers either a raw [`subscribe`](Bus::subscribe) receiver or a
//! worker-driven [`Subscribe`] implementation via [`attach`](Bus::attach).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **Bounded capacity**: a ring buffer keeps the most recent events;
//!   receivers that fall behind observe `RecvError::Lagged` and skip ahead.
//! - **No persistence**: events published with no live receiver are dropped.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::panic_message;
use crate::subscribers::Subscribe;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Capacity used by [`Bus::default`]. A repeat loop emits a handful of
    /// events per cycle, so a small ring buffer is plenty.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Creates a new bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Creates a new receiver observing subsequent events.
    ///
    /// Each call creates an independent receiver; a receiver only sees
    /// events published after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Spawns a worker loop feeding a [`Subscribe`] implementation.
    ///
    /// The worker runs until the bus is dropped (channel closed) or the
    /// returned handle is aborted. Panics inside the subscriber are caught
    /// so a buggy observer cannot take down the worker. A lagged receiver
    /// skips the missed events and keeps going.
    pub fn attach(&self, subscriber: Arc<dyn Subscribe>) -> JoinHandle<()> {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let fut = subscriber.on_event(&event);
                        if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
                            eprintln!(
                                "[recur] subscriber '{}' panicked: {}",
                                subscriber.name(),
                                panic_message(payload.as_ref()),
                            );
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
