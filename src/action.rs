//! # Action: one cycle's callable plus its outcome wiring.
//!
//! An [`Action`] wraps the user callable together with three ordered
//! callback buckets and the cycle's [`Permission`]. Calling it produces an
//! [`Outcome`] — a value or an error — and distributes that outcome:
//!
//! ```text
//! call()
//!   ├─ permission denied ──────────────► Dispatch::Suppressed (nothing runs)
//!   ├─ ActionOutput::Ready(result) ────► deliver now, Dispatch::Delivered
//!   └─ ActionOutput::Deferred(future) ─► driver task spawned,
//!                                        Dispatch::Deferred; delivery when
//!                                        the future resolves, re-gated by
//!                                        the permission at that moment
//! ```
//!
//! ## Rules
//! - Callbacks run in registration order within each bucket; the always
//!   bucket runs after done/fail for the same outcome.
//! - A panic in the callable (sync or inside the deferred future) is caught
//!   and becomes [`ActionError::Panicked`]; it never escapes `call()`.
//! - A panic in a callback is isolated: it is caught, reported as a
//!   [`CallbackPanicked`](crate::EventKind::CallbackPanicked) event, and the
//!   remaining callbacks still run.
//! - A deferred future is never cancelled; only its delivery is gated.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{panic_message, ActionError};
use crate::events::{Bus, Event, EventKind};
use crate::permission::Permission;

/// Shared action callable: produces one [`ActionOutput`] per invocation.
pub type ActionFn<T> = Arc<dyn Fn() -> ActionOutput<T> + Send + Sync>;

/// Success callback: observes the outcome value.
pub type DoneFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Failure callback: observes the outcome error.
pub type FailFn = Arc<dyn Fn(&ActionError) + Send + Sync>;

/// Completion callback: observes the full outcome, success or failure.
pub type AlwaysFn<T> = Arc<dyn Fn(&Outcome<T>) + Send + Sync>;

/// Tagged result of one action invocation.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// The action produced a value.
    Value(T),
    /// The action failed (returned an error or panicked).
    Error(ActionError),
}

impl<T> Outcome<T> {
    /// Returns `true` for [`Outcome::Value`].
    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    /// Returns `true` for [`Outcome::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Returns the value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    /// Returns the error, if any.
    pub fn error(&self) -> Option<&ActionError> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Error(e) => Some(e),
        }
    }
}

impl<T> From<Result<T, ActionError>> for Outcome<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(v) => Outcome::Value(v),
            Err(e) => Outcome::Error(e),
        }
    }
}

/// What an action callable hands back: a completed result, or a future that
/// will complete later.
///
/// The two variants replace a dynamic "is this a promise?" probe: the
/// callable declares the shape of its result, and [`Action::call`] picks the
/// synchronous or asynchronous delivery path by matching on it.
pub enum ActionOutput<T> {
    /// The action completed synchronously.
    Ready(Result<T, ActionError>),
    /// The action is still running; the future resolves to its result.
    Deferred(BoxFuture<'static, Result<T, ActionError>>),
}

impl<T> ActionOutput<T> {
    /// Wraps an already-completed result.
    pub fn ready(result: Result<T, ActionError>) -> Self {
        ActionOutput::Ready(result)
    }

    /// Boxes a future resolving to the action's result.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, ActionError>> + Send + 'static,
    {
        ActionOutput::Deferred(Box::pin(future))
    }
}

impl<T> From<Result<T, ActionError>> for ActionOutput<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        ActionOutput::Ready(result)
    }
}

/// Synchronous report of what [`Action::call`] did.
#[derive(Debug)]
pub enum Dispatch<T> {
    /// The action completed synchronously; callbacks have already run.
    Delivered(Outcome<T>),
    /// The action returned a future; a driver task now owns delivery.
    Deferred,
    /// The permission refused the call; nothing ran, nothing was delivered.
    Suppressed,
}

/// One invocation cycle: the wrapped callable plus its callback wiring.
///
/// Built fresh per cycle by the [`Scheduler`](crate::Scheduler) and consumed
/// by [`call`](Action::call); actions are never reused across cycles.
pub struct Action<T> {
    permission: Permission,
    callable: ActionFn<T>,
    done: Vec<DoneFn<T>>,
    fail: Vec<FailFn>,
    always: Vec<AlwaysFn<T>>,
    bus: Bus,
    cycle: u64,
}

impl<T: Send + 'static> Action<T> {
    /// Creates an action for one cycle.
    ///
    /// `cycle` tags the events this action publishes to `bus`.
    pub fn new(permission: Permission, callable: ActionFn<T>, bus: Bus, cycle: u64) -> Self {
        Self {
            permission,
            callable,
            done: Vec::new(),
            fail: Vec::new(),
            always: Vec::new(),
            bus,
            cycle,
        }
    }

    /// Appends a success callback. Registration order is invocation order.
    pub fn push_done(&mut self, callback: DoneFn<T>) {
        self.done.push(callback);
    }

    /// Appends a failure callback. Registration order is invocation order.
    pub fn push_fail(&mut self, callback: FailFn) {
        self.fail.push(callback);
    }

    /// Appends a completion callback, invoked after done/fail for the same
    /// outcome. Registration order is invocation order.
    pub fn push_always(&mut self, callback: AlwaysFn<T>) {
        self.always.push(callback);
    }

    /// Invokes the callable once and distributes the outcome.
    ///
    /// Synchronous results deliver before this method returns. Deferred
    /// results hand delivery to a spawned driver task, which re-checks the
    /// permission once the future resolves — a permission denied in the
    /// meantime turns that delivery into a no-op. A panic in the callable is
    /// caught and delivered as [`ActionError::Panicked`].
    ///
    /// Must be called from within a Tokio runtime when the callable can
    /// return [`ActionOutput::Deferred`].
    pub fn call(self) -> Dispatch<T> {
        if !self.permission.granted() {
            self.publish_suppressed();
            return Dispatch::Suppressed;
        }

        let output = match catch_unwind(AssertUnwindSafe(|| (self.callable)())) {
            Ok(output) => output,
            Err(payload) => ActionOutput::Ready(Err(ActionError::from_panic(payload))),
        };

        match output {
            ActionOutput::Ready(result) => {
                let outcome = Outcome::from(result);
                self.deliver(&outcome);
                Dispatch::Delivered(outcome)
            }
            ActionOutput::Deferred(future) => {
                tokio::spawn(async move {
                    let result = match AssertUnwindSafe(future).catch_unwind().await {
                        Ok(result) => result,
                        Err(payload) => Err(ActionError::from_panic(payload)),
                    };
                    self.deliver(&Outcome::from(result));
                });
                Dispatch::Deferred
            }
        }
    }

    /// Runs the callback buckets for an outcome, re-checking the permission
    /// at delivery time.
    fn deliver(&self, outcome: &Outcome<T>) {
        if !self.permission.granted() {
            self.publish_suppressed();
            return;
        }

        match outcome {
            Outcome::Value(_) => {
                self.bus
                    .publish(Event::new(EventKind::ActionCompleted).with_cycle(self.cycle));
            }
            Outcome::Error(e) => {
                self.bus.publish(
                    Event::new(EventKind::ActionFailed)
                        .with_cycle(self.cycle)
                        .with_reason(e.to_string()),
                );
            }
        }

        match outcome {
            Outcome::Value(v) => {
                for callback in &self.done {
                    self.invoke_isolated(|| callback(v));
                }
            }
            Outcome::Error(e) => {
                for callback in &self.fail {
                    self.invoke_isolated(|| callback(e));
                }
            }
        }
        for callback in &self.always {
            self.invoke_isolated(|| callback(outcome));
        }
    }

    /// Runs one callback, containing any panic so the remaining callbacks
    /// and the reschedule hook still fire.
    fn invoke_isolated(&self, f: impl FnOnce()) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
            self.bus.publish(
                Event::new(EventKind::CallbackPanicked)
                    .with_cycle(self.cycle)
                    .with_reason(panic_message(payload.as_ref())),
            );
        }
    }

    fn publish_suppressed(&self) {
        self.bus
            .publish(Event::new(EventKind::DeliverySuppressed).with_cycle(self.cycle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn recording<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Arc<Mutex<Vec<T>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (log.clone(), log)
    }

    fn action_of<T: Send + 'static>(
        callable: ActionFn<T>,
        permission: Permission,
    ) -> Action<T> {
        Action::new(permission, callable, Bus::default(), 1)
    }

    #[tokio::test]
    async fn test_sync_value_delivers_done_then_always() {
        let (order, order_probe) = recording::<&'static str>();
        let callable: ActionFn<u32> = Arc::new(|| ActionOutput::ready(Ok(5)));
        let mut action = action_of(callable, Permission::unrestricted());

        let o1 = order_probe.clone();
        action.push_done(Arc::new(move |v: &u32| {
            assert_eq!(*v, 5);
            o1.lock().unwrap().push("done1");
        }));
        let o2 = order_probe.clone();
        action.push_done(Arc::new(move |_| o2.lock().unwrap().push("done2")));
        let o3 = order_probe.clone();
        action.push_fail(Arc::new(move |_| o3.lock().unwrap().push("fail")));
        let o4 = order_probe.clone();
        action.push_always(Arc::new(move |outcome: &Outcome<u32>| {
            assert!(outcome.is_value());
            o4.lock().unwrap().push("always");
        }));

        match action.call() {
            Dispatch::Delivered(Outcome::Value(5)) => {}
            other => panic!("unexpected dispatch: {other:?}"),
        }
        assert_eq!(*order.lock().unwrap(), vec!["done1", "done2", "always"]);
    }

    #[tokio::test]
    async fn test_sync_error_routes_to_fail_and_always() {
        let (order, order_probe) = recording::<&'static str>();
        let callable: ActionFn<u32> =
            Arc::new(|| ActionOutput::ready(Err(ActionError::fail("boom"))));
        let mut action = action_of(callable, Permission::unrestricted());

        let o1 = order_probe.clone();
        action.push_done(Arc::new(move |_| o1.lock().unwrap().push("done")));
        let o2 = order_probe.clone();
        action.push_fail(Arc::new(move |e: &ActionError| {
            assert_eq!(e.as_label(), "action_failed");
            o2.lock().unwrap().push("fail");
        }));
        let o3 = order_probe.clone();
        action.push_always(Arc::new(move |outcome: &Outcome<u32>| {
            assert!(outcome.is_error());
            o3.lock().unwrap().push("always");
        }));

        match action.call() {
            Dispatch::Delivered(Outcome::Error(ActionError::Fail { .. })) => {}
            other => panic!("unexpected dispatch: {other:?}"),
        }
        assert_eq!(*order.lock().unwrap(), vec!["fail", "always"]);
    }

    #[tokio::test]
    async fn test_panicking_callable_is_caught() {
        let callable: ActionFn<u32> = Arc::new(|| panic!("kaboom"));
        let mut action = action_of(callable, Permission::unrestricted());

        let (errors, probe) = recording::<String>();
        action.push_fail(Arc::new(move |e: &ActionError| {
            probe.lock().unwrap().push(e.to_string());
        }));

        match action.call() {
            Dispatch::Delivered(Outcome::Error(ActionError::Panicked { .. })) => {}
            other => panic!("unexpected dispatch: {other:?}"),
        }
        assert_eq!(*errors.lock().unwrap(), vec!["action panicked: kaboom"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_delivery_after_resolution() {
        let (seen, probe) = recording::<u32>();
        let callable: ActionFn<u32> = Arc::new(|| {
            ActionOutput::deferred(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(7)
            })
        });
        let mut action = action_of(callable, Permission::unrestricted());
        action.push_done(Arc::new(move |v: &u32| probe.lock().unwrap().push(*v)));

        assert!(matches!(action.call(), Dispatch::Deferred));
        assert!(seen.lock().unwrap().is_empty(), "delivery must wait for the future");

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deny_suppresses_deferred_delivery() {
        let (seen, probe) = recording::<u32>();
        let permission = Permission::unrestricted();
        let callable: ActionFn<u32> = Arc::new(|| {
            ActionOutput::deferred(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(7)
            })
        });
        let mut action = action_of(callable, permission.clone());
        action.push_done(Arc::new(move |v: &u32| probe.lock().unwrap().push(*v)));

        assert!(matches!(action.call(), Dispatch::Deferred));
        permission.deny();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(seen.lock().unwrap().is_empty(), "late delivery must be suppressed");
    }

    #[tokio::test]
    async fn test_denied_permission_suppresses_call() {
        let permission = Permission::unrestricted();
        permission.deny();
        let callable: ActionFn<u32> = Arc::new(|| panic!("action must not run"));
        let action = action_of(callable, permission);

        assert!(matches!(action.call(), Dispatch::Suppressed));
    }

    #[tokio::test]
    async fn test_callback_panic_is_isolated() {
        let bus = Bus::default();
        let mut rx = bus.subscribe();
        let callable: ActionFn<u32> = Arc::new(|| ActionOutput::ready(Ok(1)));
        let mut action = Action::new(Permission::unrestricted(), callable, bus, 9);

        let (order, probe) = recording::<&'static str>();
        action.push_done(Arc::new(|_| panic!("bad callback")));
        let o = probe.clone();
        action.push_done(Arc::new(move |_| o.lock().unwrap().push("done2")));
        action.push_always(Arc::new(move |_| probe.lock().unwrap().push("always")));

        action.call();
        assert_eq!(
            *order.lock().unwrap(),
            vec!["done2", "always"],
            "callbacks after a panicking one must still run"
        );

        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ActionCompleted);
        let panic_ev = rx.try_recv().unwrap();
        assert_eq!(panic_ev.kind, EventKind::CallbackPanicked);
        assert_eq!(panic_ev.cycle, Some(9));
        assert_eq!(panic_ev.reason.as_deref(), Some("bad callback"));
    }
}
