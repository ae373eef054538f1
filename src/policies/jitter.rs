//! # Jitter for retry delays.
//!
//! [`JitterPolicy`] randomizes backoff delays so that many loops retrying
//! against the same resource do not fire in lockstep.
//!
//! - [`JitterPolicy::None`] — exact delays, predictable timing
//! - [`JitterPolicy::Full`] — random in `[0, delay]`
//! - [`JitterPolicy::Equal`] — `delay/2 + random[0, delay/2]`

use std::time::Duration;

use rand::Rng;

/// Randomization strategy applied to a computed backoff delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the exact delay. Right for a single loop or for tests.
    #[default]
    None,

    /// Random delay in `[0, delay]`. Maximum spread, can retry much sooner
    /// than the nominal delay.
    Full,

    /// `delay/2 + random[0, delay/2]`. Keeps at least half of the nominal
    /// delay while still spreading retries.
    Equal,
}

impl JitterPolicy {
    /// Applies this jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => {
                if ms == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::rng().random_range(0..=ms))
                }
            }
            JitterPolicy::Equal => {
                let half = ms / 2;
                if half == 0 {
                    delay
                } else {
                    Duration::from_millis(half + rand::rng().random_range(0..=half))
                }
            }
        }
    }
}
