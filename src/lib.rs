//! # recur
//!
//! **Recur** is a small recurring-action scheduler for Rust.
//!
//! It drives exactly one action at a time, sequentially: invoke the action,
//! wait for its outcome (synchronous or asynchronous), ask a timeout policy
//! for the next delay, sleep, invoke again — until explicitly stopped. It is
//! not a task queue, a cron system, or a worker pool; it is the control-flow
//! primitive behind "poll this endpoint every few seconds, back off while it
//! is down".
//!
//! ## Architecture
//! ### Overview
//! ```text
//!              ┌────────────────────┐
//!              │   RepeatBuilder    │  action, timeout, callbacks, permit
//!              └─────────┬──────────┘
//!                        ▼
//! ┌───────────────────────────────────────────────────────┐
//! │  Scheduler (owns the loop)                            │
//! │  - one pending timer (next cycle)                     │
//! │  - one live Permission (current cycle)                │
//! │  - Bus (broadcast lifecycle events)                   │
//! └──────┬────────────────────────────────────────────────┘
//!        │ per cycle
//!        ▼
//!     ┌──────────────────────────────┐
//!     │  Action (fresh every cycle)  │
//!     │  - callable → ActionOutput   │
//!     │  - done / fail / always      │
//!     │    buckets, permission-gated │
//!     └──────────────┬───────────────┘
//!                    ▼
//!        Outcome ─► callbacks ─► reschedule hook ─► timer ─► next cycle
//! ```
//!
//! ### Cycle lifecycle
//! ```text
//! run()
//!   ├─► halt previous cycle (abort timer, deny permission)
//!   ├─► fresh Permission(permit policy)
//!   ├─► fresh Action, callbacks wrapped via Permission::wrap,
//!   │   reschedule hook appended last in the always bucket
//!   └─► Action::call()
//!         ├─ Ready(result)    ─► deliver now, synchronously
//!         ├─ Deferred(future) ─► driver task delivers on resolution,
//!         │                      re-checking the permission at that moment
//!         └─ permission off   ─► suppressed: nothing runs, loop halts
//!
//! deliver ─► done|fail ─► always ─► hook: delay = timeout.delay(&outcome)
//!                                         timer = spawn(sleep(delay) → cycle)
//!
//! stop()  ─► abort timer, deny permission, mark stopped
//!            (an in-flight future keeps running; its delivery is gated)
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types                              |
//! |-----------------|---------------------------------------------------------|----------------------------------------|
//! | **Loop**        | Run / stop / call-now with idempotent cancellation.     | [`Repeat`], [`Scheduler`]              |
//! | **Actions**     | Sync and async actions behind one callable shape.       | [`Action`], [`ActionOutput`], [`Outcome`] |
//! | **Gating**      | Revocable delivery gate closing the late-callback race. | [`Permission`]                         |
//! | **Delays**      | Fixed, outcome-driven, or backoff-with-jitter pacing.   | [`Timeout`], [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Errors**      | Typed construction and execution errors.                | [`ConfigError`], [`ActionError`]       |
//! | **Observability** | Lifecycle events over a broadcast bus.                | [`Event`], [`Bus`], [`Subscribe`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use recur::{ActionError, Repeat};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repeat = Repeat::builder()
//!         .action(|| Ok::<_, ActionError>("tick".to_string()))
//!         .timeout(Duration::from_millis(25))
//!         .on_done(|value: &String| println!("{value}"))
//!         .on_fail(|error| eprintln!("{error}"))
//!         .build()?;
//!
//!     repeat.run();
//!     tokio::time::sleep(Duration::from_millis(80)).await;
//!     repeat.stop();
//!     Ok(())
//! }
//! ```

mod action;
mod error;
mod events;
mod permission;
mod policies;
mod repeat;
mod scheduler;
mod subscribers;

// ---- Public re-exports ----

pub use action::{Action, ActionFn, ActionOutput, AlwaysFn, Dispatch, DoneFn, FailFn, Outcome};
pub use error::{ActionError, ConfigError};
pub use events::{Bus, Event, EventKind};
pub use permission::{Permission, PermitFn};
pub use policies::{BackoffPolicy, DelayFn, JitterPolicy, Timeout};
pub use repeat::{Repeat, RepeatBuilder};
pub use scheduler::{Scheduler, SchedulerParams};
pub use subscribers::Subscribe;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
