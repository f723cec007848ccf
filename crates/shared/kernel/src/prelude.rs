//! Common imports for slices and apps.

pub use crate::domain::config::AppConfig;
pub use crate::domain::registry::{FeatureSlice, InitializedSlice};
pub use crate::events::EventRouter;
pub use crate::security::{NonceError, NonceIssuer};
#[cfg(feature = "server")]
pub use crate::server::{ApiState, ApiStateBuilder, ApiStateError};
