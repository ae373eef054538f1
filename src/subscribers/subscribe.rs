//! # Core subscriber trait.
//!
//! `Subscribe` is the extension point for plugging custom event handlers
//! into the runtime. Each subscriber is driven by a dedicated worker loop
//! spawned by [`Bus::attach`](crate::Bus::attach).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) — they do not block the
//!   publisher; they only delay their own worker.
//! - Panics inside [`on_event`](Subscribe::on_event) are caught by the
//!   worker and reported; they do not stop event delivery.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative
/// waits).
///
/// ## Example
/// ```rust
/// use async_trait::async_trait;
/// use recur::{Event, Subscribe};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Subscribe for Audit {
///     async fn on_event(&self, event: &Event) {
///         let _ = event; // write audit record...
///     }
///
///     fn name(&self) -> &'static str {
///         "audit"
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
