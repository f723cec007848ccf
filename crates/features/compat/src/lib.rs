//! Cache plugin compatibility slice.
//!
//! LMS pages are per-visitor, so page caches must skip them. Each supported cache
//! plugin has a [`CacheCompatibility`] shim keyed by the plugin slug; the
//! [`CompatRegistry`] runs them once at startup.

mod error;
pub mod host;
pub mod registry;

pub use crate::error::{CompatError, CompatErrorExt};
pub use crate::host::{CacheHost, MemoryCacheHost};
pub use crate::registry::{
    BUILTIN_KEYS, CacheCompatibility, CompatRegistry, CompatReport, EXCLUDED_PATHS, PathExclusion,
};

use lms_event_bus::EventRouter;
use lms_kernel::domain::registry::InitializedSlice;

/// Compatibility feature state
#[lms_derive::lms_slice]
#[derive(Debug)]
pub struct Compat {
    pub registry: CompatRegistry,
    /// Keys whose shim was applied at startup.
    pub applied: Vec<String>,
}

/// Runs `registry` against `host` and keeps the result as a slice.
pub fn init(events: &EventRouter, host: &dyn CacheHost, registry: CompatRegistry) -> InitializedSlice {
    let report = registry.register(host, events);
    InitializedSlice::new(Compat::new(CompatInner { registry, applied: report.applied }))
}
