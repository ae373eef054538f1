//! Pluggable event observers.
//!
//! ## Contents
//! - [`Subscribe`] — the observer contract, driven by a per-subscriber
//!   worker spawned via [`Bus::attach`](crate::Bus::attach)
//! - `LogWriter` — stdout reference subscriber (feature `logging`)

mod subscribe;

pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
