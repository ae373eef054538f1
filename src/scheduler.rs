//! # Scheduler: the owner of the repeat loop.
//!
//! One [`Scheduler`] drives exactly one action, sequentially: invoke, wait
//! for the outcome (synchronous or deferred), ask the timeout policy for a
//! delay, sleep, invoke again — until [`stop`](Scheduler::stop).
//!
//! ## Cycle anatomy
//! ```text
//! run() / timer fire
//!   ├─► fresh Permission (from the permit policy)
//!   ├─► fresh Action: user callbacks wrapped through Permission::wrap,
//!   │                 reschedule hook appended last in the always bucket
//!   └─► Action::call()
//!           │
//!           ├─ outcome delivered ─► done/fail ─► always ─► reschedule hook
//!           │                                                 │
//!           │                       delay = timeout.delay(&outcome)
//!           │                       one-shot timer ──► next cycle
//!           └─ suppressed ─► nothing runs, loop halts
//! ```
//!
//! ## Rules
//! - At most one action is logically in flight per scheduler; cycles never
//!   overlap.
//! - Exactly one live [`Permission`] and at most one pending timer exist per
//!   running cycle; both are owned here and released by `stop()`.
//! - Every cycle gets a fresh `Action` and `Permission`; nothing is reused.
//! - The reschedule hook is registered last, so it fires after every user
//!   callback for the same outcome.
//!
//! ## Cancellation semantics
//! `stop()` is best-effort: it aborts the pending timer and denies the
//! current permission, which prevents the next cycle and suppresses any
//! outcome not yet delivered. It cannot retract a synchronous callback that
//! has already been dispatched, and it does not cancel an in-flight deferred
//! future — the future keeps running; only its delivery is gated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::action::{Action, ActionFn, AlwaysFn, DoneFn, FailFn, Outcome};
use crate::error::ActionError;
use crate::events::{Bus, Event, EventKind};
use crate::permission::{Permission, PermitFn};
use crate::policies::Timeout;
use crate::subscribers::Subscribe;

/// Everything a scheduler needs to drive its loop.
///
/// Usually produced by [`RepeatBuilder`](crate::RepeatBuilder); constructing
/// it directly is the low-level path for callers that want to share a
/// [`Bus`] or skip the builder's validation.
pub struct SchedulerParams<T> {
    /// The action invoked each cycle.
    pub action: ActionFn<T>,
    /// Delay between cycles.
    pub timeout: Timeout<T>,
    /// Permit policy consulted by each cycle's [`Permission`].
    pub permit: PermitFn,
    /// Success callbacks, in registration order.
    pub done: Vec<DoneFn<T>>,
    /// Failure callbacks, in registration order.
    pub fail: Vec<FailFn>,
    /// Completion callbacks, in registration order.
    pub always: Vec<AlwaysFn<T>>,
    /// Event bus for lifecycle events.
    pub bus: Bus,
}

impl<T> SchedulerParams<T> {
    /// Creates params with an always-true permit, no callbacks, and a
    /// default-capacity bus.
    pub fn new(action: ActionFn<T>, timeout: Timeout<T>) -> Self {
        Self {
            action,
            timeout,
            permit: Arc::new(|| true),
            done: Vec::new(),
            fail: Vec::new(),
            always: Vec::new(),
            bus: Bus::default(),
        }
    }
}

/// Drives one action in a stop-controlled repeat loop.
///
/// Cheap to clone; clones share the same loop, so a callback can hold a
/// clone and call [`stop`](Scheduler::stop) from inside a cycle.
pub struct Scheduler<T> {
    inner: Arc<Shared<T>>,
}

impl<T> Clone for Scheduler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct Shared<T> {
    action: ActionFn<T>,
    timeout: Timeout<T>,
    permit: PermitFn,
    done: Vec<DoneFn<T>>,
    fail: Vec<FailFn>,
    always: Vec<AlwaysFn<T>>,
    bus: Bus,
    state: Mutex<CycleState>,
}

/// Mutable loop state: the resources of the current cycle.
struct CycleState {
    /// Gate of the current cycle, denied on `stop()`.
    permission: Option<Permission>,
    /// Pending one-shot timer for the next cycle.
    timer: Option<JoinHandle<()>>,
    /// Set by `stop()`, cleared by `run()`.
    stopped: bool,
    /// Monotonic cycle counter, for event tagging.
    cycle: u64,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Creates an idle scheduler. Nothing runs until [`run`](Scheduler::run).
    pub fn new(params: SchedulerParams<T>) -> Self {
        Self {
            inner: Arc::new(Shared {
                action: params.action,
                timeout: params.timeout,
                permit: params.permit,
                done: params.done,
                fail: params.fail,
                always: params.always,
                bus: params.bus,
                state: Mutex::new(CycleState {
                    permission: None,
                    timer: None,
                    stopped: false,
                    cycle: 0,
                }),
            }),
        }
    }

    /// Starts the loop, invoking the action once synchronously.
    ///
    /// If a cycle is already running, it is stopped first (timer aborted,
    /// permission denied) and a fresh one begins. Must be called from within
    /// a Tokio runtime.
    pub fn run(&self) {
        {
            let mut st = self.lock_state();
            halt(&mut st);
            st.stopped = false;
        }
        self.cycle();
    }

    /// Stops the loop. Idempotent; safe when idle and from inside callbacks.
    ///
    /// Aborts the pending timer, denies the current permission (suppressing
    /// any undelivered outcome of an in-flight action), and marks the
    /// scheduler stopped.
    pub fn stop(&self) {
        let halted = {
            let mut st = self.lock_state();
            let halted = halt(&mut st);
            st.stopped = true;
            halted
        };
        if halted {
            self.inner.bus.publish(Event::new(EventKind::Stopped));
        }
    }

    /// Invokes the action now, out of schedule.
    ///
    /// Equivalent to [`stop`](Scheduler::stop) followed by
    /// [`run`](Scheduler::run): the remaining wait of the current delay is
    /// discarded and a brand-new cycle starts immediately, its outcome
    /// independent of the interrupted one.
    pub fn call_now(&self) {
        self.stop();
        self.run();
    }

    /// Returns whether a cycle or timer is currently live.
    pub fn is_running(&self) -> bool {
        let st = self.lock_state();
        !st.stopped && (st.timer.is_some() || st.permission.is_some())
    }

    /// Creates a receiver observing this scheduler's lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Spawns a worker feeding lifecycle events to a subscriber.
    pub fn attach(&self, subscriber: Arc<dyn Subscribe>) -> JoinHandle<()> {
        self.inner.bus.attach(subscriber)
    }

    /// Returns the event bus.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// Runs one cycle: fresh permission, fresh action, one invocation.
    fn cycle(&self) {
        let (action, cycle_no) = {
            let mut st = self.lock_state();
            if st.stopped {
                return;
            }
            st.timer = None;
            st.cycle += 1;
            let permission = Permission::new(self.inner.permit.clone());
            st.permission = Some(permission.clone());
            (self.build_action(permission, st.cycle), st.cycle)
        };
        self.inner
            .bus
            .publish(Event::new(EventKind::CycleStarting).with_cycle(cycle_no));
        action.call();
    }

    /// Builds the cycle's action: user callbacks wrapped through the
    /// permission, reschedule hook appended last.
    fn build_action(&self, permission: Permission, cycle: u64) -> Action<T> {
        let mut action = Action::new(
            permission.clone(),
            self.inner.action.clone(),
            self.inner.bus.clone(),
            cycle,
        );

        for callback in &self.inner.done {
            let callback = callback.clone();
            action.push_done(Arc::new(permission.wrap(move |value: &T| callback(value))));
        }
        for callback in &self.inner.fail {
            let callback = callback.clone();
            action.push_fail(Arc::new(
                permission.wrap(move |error: &ActionError| callback(error)),
            ));
        }
        for callback in &self.inner.always {
            let callback = callback.clone();
            action.push_always(Arc::new(
                permission.wrap(move |outcome: &Outcome<T>| callback(outcome)),
            ));
        }

        let weak = Arc::downgrade(&self.inner);
        action.push_always(Arc::new(permission.wrap(
            move |outcome: &Outcome<T>| {
                if let Some(inner) = weak.upgrade() {
                    Scheduler { inner }.schedule_next(outcome);
                }
            },
        )));
        action
    }

    /// Arranges the next cycle after the delay the timeout policy picks for
    /// this outcome. No-op once stopped.
    fn schedule_next(&self, outcome: &Outcome<T>) {
        let delay = self.inner.timeout.delay(outcome);

        let cycle_no = {
            let mut st = self.lock_state();
            if st.stopped {
                return;
            }
            // The timer holds only a weak reference: an abandoned scheduler
            // must not keep itself alive through its own pending timer.
            let weak = Arc::downgrade(&self.inner);
            let handle = tokio::spawn(async move {
                time::sleep(delay).await;
                if let Some(inner) = weak.upgrade() {
                    Scheduler { inner }.cycle();
                }
            });
            if let Some(stale) = st.timer.replace(handle) {
                stale.abort();
            }
            st.cycle
        };
        self.inner.bus.publish(
            Event::new(EventKind::Rescheduled)
                .with_cycle(cycle_no)
                .with_delay(delay),
        );
    }

    fn lock_state(&self) -> MutexGuard<'_, CycleState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the current cycle's resources. Returns whether anything was live.
fn halt(st: &mut CycleState) -> bool {
    let mut halted = false;
    if let Some(timer) = st.timer.take() {
        timer.abort();
        halted = true;
    }
    if let Some(permission) = st.permission.take() {
        permission.deny();
        halted = true;
    }
    halted
}
