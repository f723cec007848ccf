//! The site the cache plugins run on.

use crate::error::CompatError;
use fxhash::FxHashSet;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;

pub trait CacheHost: Send + Sync {
    /// `false` while the site itself is still being installed.
    fn is_installed(&self) -> bool;

    fn is_plugin_active(&self, key: &str) -> bool;

    /// Asks the cache plugin `key` never to cache `paths`.
    ///
    /// # Errors
    /// Returns [`CompatError::Host`] if the plugin settings could not be updated.
    fn exclude_paths(&self, key: &str, paths: &[&str]) -> Result<(), CompatError>;
}

/// Host kept in memory; records every exclusion per plugin.
#[derive(Debug, Default)]
pub struct MemoryCacheHost {
    installed: bool,
    active: RwLock<FxHashSet<String>>,
    exclusions: Mutex<BTreeMap<String, Vec<String>>>,
    failing: RwLock<FxHashSet<String>>,
}

impl MemoryCacheHost {
    /// An installed site with no active cache plugin.
    #[must_use]
    pub fn installed() -> Self {
        Self { installed: true, ..Self::default() }
    }

    /// A site that is still being installed.
    #[must_use]
    pub fn installing() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_active(self, key: &str) -> Self {
        self.active.write().insert(key.to_owned());
        self
    }

    /// Makes `exclude_paths` fail for `key`.
    #[must_use]
    pub fn with_failing(self, key: &str) -> Self {
        self.failing.write().insert(key.to_owned());
        self
    }

    #[must_use]
    pub fn exclusions(&self, key: &str) -> Vec<String> {
        self.exclusions.lock().get(key).cloned().unwrap_or_default()
    }

    /// Plugins that received at least one exclusion, in key order.
    #[must_use]
    pub fn configured(&self) -> Vec<String> {
        self.exclusions.lock().keys().cloned().collect()
    }
}

impl CacheHost for MemoryCacheHost {
    fn is_installed(&self) -> bool {
        self.installed
    }

    fn is_plugin_active(&self, key: &str) -> bool {
        self.active.read().contains(key)
    }

    fn exclude_paths(&self, key: &str, paths: &[&str]) -> Result<(), CompatError> {
        if self.failing.read().contains(key) {
            return Err(CompatError::Host {
                message: "settings are read-only".into(),
                context: Some(key.to_owned().into()),
            });
        }

        let mut exclusions = self.exclusions.lock();
        let entry = exclusions.entry(key.to_owned()).or_default();
        for path in paths {
            if !entry.iter().any(|p| p == path) {
                entry.push((*path).to_owned());
            }
        }
        Ok(())
    }
}
