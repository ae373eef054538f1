//! # Exponential backoff for failing actions.
//!
//! [`BackoffPolicy`] computes the delay before attempt `n` as
//! `first × factor^n`, clamped to `max`, with jitter applied last. The base
//! is derived purely from the attempt number, so jitter never feeds back
//! into later delays.
//!
//! On its own this is just arithmetic; [`Timeout::backoff`](crate::Timeout::backoff)
//! turns it into an outcome-driven delay policy that grows while the action
//! keeps failing and resets once it succeeds.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use recur::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.delay(0), Duration::from_millis(100));
//! assert_eq!(backoff.delay(3), Duration::from_millis(800));
//! assert_eq!(backoff.delay(30), Duration::from_secs(10)); // clamped
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Parameters controlling how retry delays grow.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay for attempt 0.
    pub first: Duration,
    /// Cap on the computed delay.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns `first = 100ms`, `max = 30s`, `factor = 2.0`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given attempt number (0-indexed).
    ///
    /// Overflowing or non-finite intermediate values clamp to `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let max = self.max.as_secs_f64();
        let raw = self.first.as_secs_f64() * self.factor.powi(attempt.min(i32::MAX as u32) as i32);

        let base = if raw.is_finite() && raw >= 0.0 && raw <= max {
            Duration::from_secs_f64(raw)
        } else {
            self.max
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(first_ms: u64, max_s: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_secs(max_s),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn test_attempt_zero_uses_first() {
        assert_eq!(plain(100, 30, 2.0).delay(0), Duration::from_millis(100));
    }

    #[test]
    fn test_exponential_growth() {
        let policy = plain(100, 30, 2.0);
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn test_constant_factor() {
        let policy = plain(500, 30, 1.0);
        for attempt in 0..10 {
            assert_eq!(policy.delay(attempt), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_clamps_to_max() {
        assert_eq!(plain(100, 1, 2.0).delay(10), Duration::from_secs(1));
        assert_eq!(plain(100, 10, 2.0).delay(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_first_exceeding_max_clamps() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.delay(0), Duration::from_secs(5));
    }

    #[test]
    fn test_full_jitter_never_exceeds_base() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::Full,
        };
        for attempt in 0..10 {
            let base = plain(100, 30, 2.0).delay(attempt);
            assert!(policy.delay(attempt) <= base);
        }
    }
}
