//! # Timeout policy: how long to wait between cycles.
//!
//! [`Timeout`] is the delay side of the repeat loop: after each outcome the
//! scheduler asks it for the pause before the next cycle. It comes in two
//! shapes, matching the "number or function" configuration surface:
//!
//! - [`Timeout::Fixed`] — a constant delay;
//! - [`Timeout::Policy`] — a closure that inspects the [`Outcome`] of the
//!   just-completed cycle and decides the delay, which is how exponential
//!   backoff, error-aware pacing, or value-driven polling intervals are
//!   expressed.
//!
//! [`Timeout::backoff`] is the ready-made policy: steady `first` interval
//! while the action succeeds, growing delays while it fails.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::action::Outcome;
use crate::policies::backoff::BackoffPolicy;

/// Shared delay policy: maps an outcome to the pause before the next cycle.
pub type DelayFn<T> = Arc<dyn Fn(&Outcome<T>) -> Duration + Send + Sync>;

/// Delay between cycles: fixed, or computed from the last outcome.
pub enum Timeout<T> {
    /// Constant delay regardless of outcome.
    Fixed(Duration),
    /// Delay computed from the outcome of the just-completed cycle.
    Policy(DelayFn<T>),
}

impl<T> Timeout<T> {
    /// Constant delay.
    pub fn fixed(delay: Duration) -> Self {
        Timeout::Fixed(delay)
    }

    /// Outcome-driven delay.
    pub fn policy<F>(f: F) -> Self
    where
        F: Fn(&Outcome<T>) -> Duration + Send + Sync + 'static,
    {
        Timeout::Policy(Arc::new(f))
    }

    /// Outcome-driven backoff: consecutive errors walk up the backoff
    /// curve, any success resets it.
    ///
    /// A success waits `policy.delay(0)` (the `first` interval, clamped and
    /// jittered); the n-th consecutive error waits `policy.delay(n - 1)`.
    pub fn backoff(policy: BackoffPolicy) -> Self {
        let failures = AtomicU32::new(0);
        Self::policy(move |outcome| match outcome {
            Outcome::Value(_) => {
                failures.store(0, Ordering::Relaxed);
                policy.delay(0)
            }
            Outcome::Error(_) => {
                let attempt = failures.fetch_add(1, Ordering::Relaxed);
                policy.delay(attempt)
            }
        })
    }

    /// Resolves the delay for an outcome.
    pub fn delay(&self, outcome: &Outcome<T>) -> Duration {
        match self {
            Timeout::Fixed(delay) => *delay,
            Timeout::Policy(f) => f(outcome),
        }
    }
}

impl<T> Clone for Timeout<T> {
    fn clone(&self) -> Self {
        match self {
            Timeout::Fixed(delay) => Timeout::Fixed(*delay),
            Timeout::Policy(f) => Timeout::Policy(f.clone()),
        }
    }
}

impl<T> From<Duration> for Timeout<T> {
    fn from(delay: Duration) -> Self {
        Timeout::Fixed(delay)
    }
}
