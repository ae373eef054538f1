//! Error types used by the recur runtime.
//!
//! This module defines two main error enums:
//!
//! - [`ConfigError`] — construction-time failures reported by the
//!   [`RepeatBuilder`](crate::RepeatBuilder); the object is never created.
//! - [`ActionError`] — failures of a single action invocation. These are
//!   recovered by the [`Action`](crate::Action): they are routed to the
//!   fail/always callback buckets and never propagate out of `call()`.
//!
//! Both types provide `as_label` for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors raised while building a repeat loop.
///
/// Raised synchronously by [`RepeatBuilder::build`](crate::RepeatBuilder::build)
/// when a required option is absent. Fatal to construction.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No action was supplied; there is nothing to repeat.
    #[error("an action is required")]
    MissingAction,

    /// No timeout was supplied; neither a fixed delay nor a delay policy.
    #[error("a timeout delay or delay policy is required")]
    MissingTimeout,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use recur::ConfigError;
    ///
    /// assert_eq!(ConfigError::MissingAction.as_label(), "config_missing_action");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingAction => "config_missing_action",
            ConfigError::MissingTimeout => "config_missing_timeout",
        }
    }
}

/// # Errors produced by one action invocation.
///
/// An `ActionError` becomes the [`Outcome::Error`](crate::Outcome::Error)
/// payload of the cycle that produced it. The scheduler keeps running after
/// one: the reschedule hook sits in the always bucket, so the loop continues
/// and the timeout policy decides how long to wait before the next attempt.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ActionError {
    /// The action (or the future it returned) resolved to an error.
    #[error("action failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The action (or the future it returned) panicked; the panic was caught
    /// and converted instead of unwinding through the scheduler.
    #[error("action panicked: {info}")]
    Panicked {
        /// The panic payload, rendered as text.
        info: String,
    },
}

impl ActionError {
    /// Creates an [`ActionError::Fail`] from any displayable message.
    pub fn fail(error: impl Into<String>) -> Self {
        ActionError::Fail {
            error: error.into(),
        }
    }

    /// Converts a caught panic payload into [`ActionError::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        ActionError::Panicked {
            info: panic_message(payload.as_ref()),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use recur::ActionError;
    ///
    /// assert_eq!(ActionError::fail("boom").as_label(), "action_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionError::Fail { .. } => "action_failed",
            ActionError::Panicked { .. } => "action_panicked",
        }
    }

    /// Indicates whether this error came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, ActionError::Panicked { .. })
    }
}

/// Renders a panic payload as text. Panics carry `&str` or `String` in
/// practice; anything else gets a placeholder.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_labels() {
        assert_eq!(ConfigError::MissingAction.as_label(), "config_missing_action");
        assert_eq!(ConfigError::MissingTimeout.as_label(), "config_missing_timeout");
    }

    #[test]
    fn test_action_error_display() {
        let err = ActionError::fail("connection refused");
        assert_eq!(err.to_string(), "action failed: connection refused");
        assert!(!err.is_panic());
    }

    #[test]
    fn test_panic_payload_rendering() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let err = ActionError::from_panic(payload);
        assert!(err.is_panic());
        assert_eq!(err.to_string(), "action panicked: boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");

        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
