//! Axum plumbing shared by every slice that exposes HTTP routes.

mod health;
pub mod router;
mod state;

pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt};
