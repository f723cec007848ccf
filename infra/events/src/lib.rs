//! # Event Router
//!
//! A type-safe, synchronous event router for vertical slice architectures.
//!
//! ## Overview
//!
//! Slices register handlers for a concrete event type; publishers call
//! [`EventRouter::dispatch`] and every handler runs on the calling thread.
//!
//! ## Features
//!
//! * **Type-Safe**: Events are identified by their Rust type.
//! * **Ordered**: Handlers run by ascending priority, then registration order.
//! * **Isolated**: A failing or panicking handler is logged and recorded in the
//!   [`DispatchReport`]; the remaining handlers still run.
//! * **Shared**: `EventRouter` is a cheap `Arc` clone; one router serves every slice.
//!
//! # Example
//!
//! ```rust
//! use lms_event_bus::EventRouter;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! #[derive(Debug)]
//! struct OrderCompleted { order_id: u64 }
//!
//! let router = EventRouter::new();
//! let seen = Arc::new(AtomicU64::new(0));
//! let sink = Arc::clone(&seen);
//!
//! router.on("remember_order", move |event: &OrderCompleted| {
//!     sink.store(event.order_id, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! let report = router.dispatch(&OrderCompleted { order_id: 42 });
//! assert!(report.is_clean());
//! assert_eq!(seen.load(Ordering::SeqCst), 42);
//! ```

mod error;
mod router;

pub use error::{EventBusError, EventBusErrorExt};
pub use router::{
    BoxError, DEFAULT_PRIORITY, DispatchReport, Event, EventRouter, HandlerFailure, HandlerId,
    HandlerResult,
};
