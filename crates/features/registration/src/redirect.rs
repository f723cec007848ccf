//! Post-registration redirect target.

use crate::error::RegistrationError;
use lms_domain::config::RegistrationConfig;
use lms_domain::constants::DASHBOARD_FRAGMENT;
use tracing::warn;
use url::Url;

/// Validates redirect candidates against the account page host and the
/// configured allow-list. Anything else falls back to the dashboard.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    default: Url,
    allowed_hosts: Vec<String>,
}

impl RedirectPolicy {
    /// # Errors
    /// Returns [`RegistrationError::Config`] if `account_page_url` is not an absolute
    /// http(s) URL with a host.
    pub fn from_config(config: &RegistrationConfig) -> Result<Self, RegistrationError> {
        let raw = format!("{}{DASHBOARD_FRAGMENT}", config.account_page_url.trim().trim_end_matches('/'));
        let default = Url::parse(&raw).map_err(|e| RegistrationError::Config {
            message: format!("account_page_url '{}': {e}", config.account_page_url).into(),
            context: Some("Building the dashboard redirect".into()),
        })?;

        let Some(host) = default.host_str().filter(|_| is_http(&default)) else {
            return Err(RegistrationError::Config {
                message: format!("account_page_url '{}' must be http(s) with a host", config.account_page_url)
                    .into(),
                context: Some("Building the dashboard redirect".into()),
            });
        };

        let mut allowed_hosts = vec![host.to_ascii_lowercase()];
        allowed_hosts.extend(
            config
                .allowed_redirect_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty()),
        );

        Ok(Self { default, allowed_hosts })
    }

    /// `<account_page_url>/#/dashboard`.
    #[must_use]
    pub const fn default_destination(&self) -> &Url {
        &self.default
    }

    /// Resolves `candidate` (absolute, or relative to the account page) and keeps it
    /// only if its host is allowed.
    #[must_use]
    pub fn validate(&self, candidate: &str) -> Url {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return self.default.clone();
        }

        let resolved = match Url::parse(candidate) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.default.join(candidate),
            Err(e) => Err(e),
        };

        match resolved {
            Ok(url) if self.is_allowed(&url) => url,
            Ok(url) => {
                warn!(target_url = %url, "Redirect host not allowed, using dashboard");
                self.default.clone()
            },
            Err(e) => {
                warn!(candidate, error = %e, "Unparsable redirect, using dashboard");
                self.default.clone()
            },
        }
    }

    fn is_allowed(&self, url: &Url) -> bool {
        is_http(url)
            && url.host_str().is_some_and(|host| {
                let host = host.to_ascii_lowercase();
                self.allowed_hosts.iter().any(|allowed| *allowed == host)
            })
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
