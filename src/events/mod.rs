//! Runtime events and the bus that carries them.
//!
//! The scheduler reports its lifecycle (cycles starting, outcomes, delays,
//! suppression, stop) through a broadcast [`Bus`] rather than a logging
//! facade; observers attach a [`Subscribe`](crate::Subscribe) or consume a
//! raw receiver.
//!
//! ## Contents
//! - [`Event`] / [`EventKind`] — what happened, with metadata
//! - [`Bus`] — non-blocking broadcast channel with subscriber workers

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
