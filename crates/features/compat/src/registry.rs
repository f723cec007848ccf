//! Key → handler table for cache plugin compatibilities.

use crate::error::CompatError;
use crate::host::CacheHost;
use lms_domain::events::{CacheCompatibilitiesRegistered, CacheCompatibilitiesRegistering};
use lms_event_bus::EventRouter;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// LMS page paths no cache plugin may serve from cache.
pub const EXCLUDED_PATHS: [&str; 3] = ["account", "checkout", "learn"];

pub const W3_TOTAL_CACHE: &str = "w3-total-cache";
pub const WP_FASTEST_CACHE: &str = "wp-fastest-cache";
pub const WP_SUPER_CACHE: &str = "wp-super-cache";
pub const WP_OPTIMIZE: &str = "wp-optimize";
pub const HUMMING_BIRD: &str = "humming-bird";
pub const LITESPEED: &str = "litespeed";
pub const WP_ROCKET: &str = "wp-rocket";

pub const BUILTIN_KEYS: [&str; 7] =
    [W3_TOTAL_CACHE, WP_FASTEST_CACHE, WP_SUPER_CACHE, WP_OPTIMIZE, HUMMING_BIRD, LITESPEED, WP_ROCKET];

/// Compatibility shim for one cache plugin.
pub trait CacheCompatibility: Send + Sync {
    fn key(&self) -> &str;

    /// Applies the shim. Returns `false` when the plugin is not active on `host`.
    ///
    /// # Errors
    /// Returns the host error if the shim could not be applied.
    fn init(&self, host: &dyn CacheHost) -> Result<bool, CompatError>;
}

/// Shim shared by every built-in plugin: exclude the LMS pages from caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathExclusion {
    key: &'static str,
}

impl PathExclusion {
    #[must_use]
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }
}

impl CacheCompatibility for PathExclusion {
    fn key(&self) -> &str {
        self.key
    }

    fn init(&self, host: &dyn CacheHost) -> Result<bool, CompatError> {
        if !host.is_plugin_active(self.key) {
            return Ok(false);
        }
        host.exclude_paths(self.key, &EXCLUDED_PATHS)?;
        Ok(true)
    }
}

/// Outcome of [`CompatRegistry::register`].
#[derive(Debug, Default)]
pub struct CompatReport {
    /// `false` when the site was not installed and nothing ran.
    pub ran: bool,
    pub applied: Vec<String>,
    pub inactive: Vec<String>,
    pub failed: Vec<(String, CompatError)>,
}

impl CompatReport {
    /// Handlers that were initialized, whatever their result.
    #[must_use]
    pub fn count(&self) -> usize {
        self.applied.len() + self.inactive.len() + self.failed.len()
    }
}

#[derive(Clone, Default)]
pub struct CompatRegistry {
    handlers: BTreeMap<String, Arc<dyn CacheCompatibility>>,
}

impl fmt::Debug for CompatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatRegistry").field("keys", &self.keys()).finish()
    }
}

impl CompatRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven built-in cache plugin shims.
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN_KEYS
            .into_iter()
            .fold(Self::new(), |registry, key| registry.with(Arc::new(PathExclusion::new(key))))
    }

    /// Adds `handler`, replacing any handler with the same key.
    #[must_use]
    pub fn with(mut self, handler: Arc<dyn CacheCompatibility>) -> Self {
        self.handlers.insert(handler.key().to_owned(), handler);
        self
    }

    #[must_use]
    pub fn without(mut self, key: &str) -> Self {
        self.handlers.remove(key);
        self
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Initializes every handler in key order, between the registering and
    /// registered events. Does nothing while the site is not installed.
    pub fn register(&self, host: &dyn CacheHost, router: &EventRouter) -> CompatReport {
        if !host.is_installed() {
            debug!("Site not installed, skipping cache compatibilities");
            return CompatReport::default();
        }

        router.dispatch(&CacheCompatibilitiesRegistering);

        let mut report = CompatReport { ran: true, ..CompatReport::default() };
        for (key, handler) in &self.handlers {
            match handler.init(host) {
                Ok(true) => {
                    debug!(key = %key, "Cache compatibility applied");
                    report.applied.push(key.clone());
                },
                Ok(false) => report.inactive.push(key.clone()),
                Err(e) => {
                    warn!(key = %key, error = %e, "Cache compatibility failed");
                    report.failed.push((key.clone(), e));
                },
            }
        }

        router.dispatch(&CacheCompatibilitiesRegistered { count: report.count() });
        info!(
            applied = report.applied.len(),
            failed = report.failed.len(),
            "Cache compatibilities registered"
        );
        report
    }
}
