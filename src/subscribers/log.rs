//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [cycle-starting] cycle=1
//! [completed] cycle=1
//! [failed] cycle=2 err="connection refused"
//! [rescheduled] cycle=2 delay_ms=400
//! [suppressed] cycle=3
//! [callback-panicked] cycle=3 err="boom"
//! [stopped]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Intended for development and
/// demonstration; implement a custom [`Subscribe`] for structured logging
/// or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        let cycle = event.cycle.unwrap_or(0);
        match event.kind {
            EventKind::CycleStarting => {
                println!("[cycle-starting] cycle={cycle}");
            }
            EventKind::ActionCompleted => {
                println!("[completed] cycle={cycle}");
            }
            EventKind::ActionFailed => {
                println!("[failed] cycle={cycle} err={:?}", event.reason);
            }
            EventKind::DeliverySuppressed => {
                println!("[suppressed] cycle={cycle}");
            }
            EventKind::Rescheduled => {
                println!(
                    "[rescheduled] cycle={cycle} delay_ms={}",
                    event.delay_ms.unwrap_or(0)
                );
            }
            EventKind::CallbackPanicked => {
                println!("[callback-panicked] cycle={cycle} err={:?}", event.reason);
            }
            EventKind::Stopped => {
                println!("[stopped]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
