//! # Runtime events emitted by the scheduler and its actions.
//!
//! [`EventKind`] classifies what happened during a cycle; [`Event`] carries
//! the metadata (timestamp, cycle number, delay, reason) attached with
//! `with_*` combinators.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use recur::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Rescheduled)
//!     .with_cycle(3)
//!     .with_delay(Duration::from_millis(250));
//!
//! assert_eq!(ev.kind, EventKind::Rescheduled);
//! assert_eq!(ev.cycle, Some(3));
//! assert_eq!(ev.delay_ms, Some(250));
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A new cycle is starting: a fresh action is about to be invoked.
    ///
    /// Sets: `cycle`.
    CycleStarting,

    /// The action of a cycle completed with a value.
    ///
    /// Sets: `cycle`.
    ActionCompleted,

    /// The action of a cycle completed with an error (returned or panicked).
    ///
    /// Sets: `cycle`, `reason`.
    ActionFailed,

    /// Callback delivery was suppressed because the cycle's permission was
    /// not granted at delivery time (denied by `stop()`, or the permit
    /// policy currently refuses). Nothing ran; the loop does not reschedule
    /// from a suppressed cycle.
    ///
    /// Sets: `cycle`.
    DeliverySuppressed,

    /// The next cycle has been scheduled.
    ///
    /// Sets: `cycle` (the cycle that just completed), `delay_ms`.
    Rescheduled,

    /// A user-supplied callback panicked. The panic was caught; remaining
    /// callbacks and the reschedule hook still ran.
    ///
    /// Sets: `cycle`, `reason`.
    CallbackPanicked,

    /// The scheduler was stopped while a cycle or timer was live.
    Stopped,
}

/// Runtime event with optional metadata.
///
/// Only the fields relevant to the [`EventKind`] are populated; see the
/// kind's documentation for which.
#[derive(Clone, Debug)]
pub struct Event {
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Cycle number (1-based, monotonic per scheduler).
    pub cycle: Option<u64>,
    /// Delay before the next cycle, in milliseconds.
    pub delay_ms: Option<u64>,
    /// Human-readable reason (error message, panic payload).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp.
    pub fn new(kind: EventKind) -> Self {
        Self {
            at: SystemTime::now(),
            kind,
            cycle: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a cycle number.
    #[inline]
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = Some(delay.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
