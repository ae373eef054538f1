//! # Repeat: the convenience front door.
//!
//! [`Repeat`] bundles a [`Scheduler`](crate::Scheduler) behind a validating
//! builder: supply an action and a timeout, optionally callbacks and a
//! permit policy, and get a ready-to-run loop or a [`ConfigError`].
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use recur::{ActionError, Repeat};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repeat = Repeat::builder()
//!     .action(|| Ok::<_, ActionError>("tick".to_string()))
//!     .timeout(Duration::from_millis(20))
//!     .on_done(|value: &String| println!("{value}"))
//!     .build()?;
//!
//! repeat.run();
//! tokio::time::sleep(Duration::from_millis(70)).await;
//! repeat.stop();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::action::{ActionFn, ActionOutput, AlwaysFn, DoneFn, FailFn, Outcome};
use crate::error::{ActionError, ConfigError};
use crate::events::{Bus, Event};
use crate::permission::PermitFn;
use crate::policies::{BackoffPolicy, Timeout};
use crate::scheduler::{Scheduler, SchedulerParams};
use crate::subscribers::Subscribe;

/// A configured repeat loop.
///
/// Thin wrapper over [`Scheduler`]; the builder is where the configuration
/// surface lives.
pub struct Repeat<T> {
    scheduler: Scheduler<T>,
}

impl<T: Send + 'static> Repeat<T> {
    /// Starts configuring a repeat loop.
    pub fn builder() -> RepeatBuilder<T> {
        RepeatBuilder::default()
    }

    /// Starts the loop. See [`Scheduler::run`].
    pub fn run(&self) {
        self.scheduler.run();
    }

    /// Invokes the action now, out of schedule. See [`Scheduler::call_now`].
    pub fn call_now(&self) {
        self.scheduler.call_now();
    }

    /// Stops the loop. See [`Scheduler::stop`].
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Returns whether a cycle or timer is currently live.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Creates a receiver observing lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.scheduler.events()
    }

    /// Spawns a worker feeding lifecycle events to a subscriber.
    pub fn attach(&self, subscriber: Arc<dyn Subscribe>) -> JoinHandle<()> {
        self.scheduler.attach(subscriber)
    }

    /// Returns the underlying scheduler.
    pub fn scheduler(&self) -> &Scheduler<T> {
        &self.scheduler
    }
}

/// Builder for [`Repeat`].
///
/// `action` and a timeout (any of [`timeout`](RepeatBuilder::timeout),
/// [`timeout_with`](RepeatBuilder::timeout_with),
/// [`timeout_backoff`](RepeatBuilder::timeout_backoff)) are required;
/// everything else is optional. Callback registration order is delivery
/// order.
pub struct RepeatBuilder<T> {
    action: Option<ActionFn<T>>,
    timeout: Option<Timeout<T>>,
    done: Vec<DoneFn<T>>,
    fail: Vec<FailFn>,
    always: Vec<AlwaysFn<T>>,
    permit: Option<PermitFn>,
    bus_capacity: usize,
}

impl<T> Default for RepeatBuilder<T> {
    fn default() -> Self {
        Self {
            action: None,
            timeout: None,
            done: Vec::new(),
            fail: Vec::new(),
            always: Vec::new(),
            permit: None,
            bus_capacity: Bus::DEFAULT_CAPACITY,
        }
    }
}

impl<T: Send + 'static> RepeatBuilder<T> {
    /// Sets the action invoked each cycle.
    ///
    /// The closure may return anything convertible into an
    /// [`ActionOutput`]: a `Result<T, ActionError>` for synchronous actions,
    /// or [`ActionOutput::deferred`] for asynchronous ones.
    pub fn action<F, O>(mut self, f: F) -> Self
    where
        F: Fn() -> O + Send + Sync + 'static,
        O: Into<ActionOutput<T>>,
    {
        self.action = Some(Arc::new(move || f().into()));
        self
    }

    /// Sets a fixed delay between cycles.
    pub fn timeout(mut self, delay: Duration) -> Self {
        self.timeout = Some(Timeout::fixed(delay));
        self
    }

    /// Sets an outcome-driven delay policy.
    pub fn timeout_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Outcome<T>) -> Duration + Send + Sync + 'static,
    {
        self.timeout = Some(Timeout::policy(f));
        self
    }

    /// Sets an error-driven backoff delay. See [`Timeout::backoff`].
    pub fn timeout_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.timeout = Some(Timeout::backoff(policy));
        self
    }

    /// Appends a success callback.
    pub fn on_done<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.done.push(Arc::new(f));
        self
    }

    /// Appends a failure callback.
    pub fn on_fail<F>(mut self, f: F) -> Self
    where
        F: Fn(&ActionError) + Send + Sync + 'static,
    {
        self.fail.push(Arc::new(f));
        self
    }

    /// Appends a completion callback, invoked after done/fail.
    pub fn on_always<F>(mut self, f: F) -> Self
    where
        F: Fn(&Outcome<T>) + Send + Sync + 'static,
    {
        self.always.push(Arc::new(f));
        self
    }

    /// Sets the permit policy consulted by each cycle's permission.
    /// Defaults to always-true.
    pub fn permit<F>(mut self, f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.permit = Some(Arc::new(f));
        self
    }

    /// Sets the event channel capacity.
    pub fn bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Validates the configuration and builds the loop.
    ///
    /// # Errors
    /// [`ConfigError::MissingAction`] without an action,
    /// [`ConfigError::MissingTimeout`] without a timeout.
    pub fn build(self) -> Result<Repeat<T>, ConfigError> {
        let action = self.action.ok_or(ConfigError::MissingAction)?;
        let timeout = self.timeout.ok_or(ConfigError::MissingTimeout)?;

        let mut params = SchedulerParams::new(action, timeout);
        params.done = self.done;
        params.fail = self.fail;
        params.always = self.always;
        params.bus = Bus::new(self.bus_capacity);
        if let Some(permit) = self.permit {
            params.permit = permit;
        }

        Ok(Repeat {
            scheduler: Scheduler::new(params),
        })
    }
}
