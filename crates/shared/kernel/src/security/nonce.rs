use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::borrow::Cow;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Bytes kept from the MAC; the nonce is their hex form.
const NONCE_BYTES: usize = 10;
const NONCE_LEN: usize = NONCE_BYTES * 2;
/// Default nonce lifetime (one day, accepted across two half-day ticks).
const DEFAULT_LIFETIME: Duration = Duration::from_secs(86_400);

#[lms_derive::lms_error]
pub enum NonceError {
    #[error("Nonce configuration error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Internal nonce error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Issues and verifies CSRF nonces bound to a session and an action.
///
/// A nonce is the truncated HMAC-SHA256, keyed by the secret, of the
/// length-prefixed `tick`, `session` and `action`, where `tick` advances every
/// half lifetime. Verification accepts the current and the
/// previous tick, so a nonce stays valid between one half and one full lifetime.
#[derive(Clone)]
pub struct NonceIssuer {
    mac: HmacSha256,
    half_life: u64,
}

impl std::fmt::Debug for NonceIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceIssuer")
            .field("secret", &"<redacted>")
            .field("half_life", &self.half_life)
            .finish()
    }
}

impl NonceIssuer {
    /// Creates an issuer with the default one-day lifetime.
    ///
    /// # Errors
    /// Returns [`NonceError::Config`] if `secret` is blank.
    pub fn new(secret: impl Into<String>) -> Result<Self, NonceError> {
        Self::with_lifetime(secret, DEFAULT_LIFETIME)
    }

    /// Creates an issuer with a custom lifetime.
    ///
    /// # Errors
    /// Returns [`NonceError::Config`] if `secret` is blank or `lifetime` is shorter
    /// than two seconds.
    pub fn with_lifetime(secret: impl Into<String>, lifetime: Duration) -> Result<Self, NonceError> {
        let secret: String = secret.into();
        if secret.trim().is_empty() {
            return Err(NonceError::Config { message: "Nonce secret cannot be empty".into(), context: None });
        }
        let half_life = lifetime.as_secs() / 2;
        if half_life == 0 {
            return Err(NonceError::Config {
                message: format!("Nonce lifetime too short: {lifetime:?}").into(),
                context: None,
            });
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| NonceError::Config {
            message: e.to_string().into(),
            context: Some("Keying nonce MAC".into()),
        })?;
        Ok(Self { mac, half_life })
    }

    /// Issues a nonce for `session` and `action` at the current time.
    ///
    /// # Errors
    /// Returns [`NonceError::Internal`] if the system clock is before the Unix epoch.
    pub fn issue(&self, session: &str, action: &str) -> Result<String, NonceError> {
        Ok(self.issue_at(session, action, now_secs()?))
    }

    /// Issues a nonce as of `now` (seconds since the Unix epoch).
    #[must_use]
    pub fn issue_at(&self, session: &str, action: &str, now: u64) -> String {
        let tag = self.keyed(self.tick(now), session, action).finalize().into_bytes();
        hex::encode(&tag[..NONCE_BYTES])
    }

    /// Verifies `nonce` against `session` and `action` at the current time.
    #[must_use]
    pub fn verify(&self, nonce: &str, session: &str, action: &str) -> bool {
        now_secs().is_ok_and(|now| self.verify_at(nonce, session, action, now))
    }

    /// Verifies `nonce` as of `now` (seconds since the Unix epoch).
    #[must_use]
    pub fn verify_at(&self, nonce: &str, session: &str, action: &str, now: u64) -> bool {
        if nonce.len() != NONCE_LEN {
            return false;
        }
        let Ok(tag) = hex::decode(nonce) else {
            return false;
        };
        let tick = self.tick(now);
        [Some(tick), tick.checked_sub(1)]
            .into_iter()
            .flatten()
            .any(|t| self.keyed(t, session, action).verify_truncated_left(&tag).is_ok())
    }

    const fn tick(&self, now: u64) -> u64 {
        now / self.half_life
    }

    fn keyed(&self, tick: u64, session: &str, action: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(&tick.to_be_bytes());
        for part in [session, action] {
            mac.update(&(part.len() as u64).to_be_bytes());
            mac.update(part.as_bytes());
        }
        mac
    }
}

fn now_secs() -> Result<u64, NonceError> {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).map_err(|e| NonceError::Internal {
        message: e.to_string().into(),
        context: Some("Failed to get current system time".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn issuer() -> NonceIssuer {
        NonceIssuer::new("test-secret").unwrap()
    }

    #[test]
    fn issued_nonce_verifies() {
        let issuer = issuer();
        let nonce = issuer.issue_at("session-a", "lms-register", NOW);
        assert_eq!(nonce.len(), NONCE_LEN);
        assert!(issuer.verify_at(&nonce, "session-a", "lms-register", NOW));
    }

    #[test]
    fn nonce_is_bound_to_session_and_action() {
        let issuer = issuer();
        let nonce = issuer.issue_at("session-a", "lms-register", NOW);
        assert!(!issuer.verify_at(&nonce, "session-b", "lms-register", NOW));
        assert!(!issuer.verify_at(&nonce, "session-a", "lms-login", NOW));
    }

    #[test]
    fn nonce_survives_one_tick_then_expires() {
        let issuer = issuer();
        let half = DEFAULT_LIFETIME.as_secs() / 2;
        let nonce = issuer.issue_at("s", "a", NOW);

        assert!(issuer.verify_at(&nonce, "s", "a", NOW + half));
        assert!(!issuer.verify_at(&nonce, "s", "a", NOW + 2 * half + half));
    }

    #[test]
    fn separators_in_session_do_not_collide_with_action() {
        let issuer = issuer();
        let nonce = issuer.issue_at("a|b", "c", NOW);
        assert!(!issuer.verify_at(&nonce, "a", "b|c", NOW));
        assert_ne!(nonce, issuer.issue_at("a", "b|c", NOW));
    }

    #[test]
    fn different_secrets_issue_different_nonces() {
        let other = NonceIssuer::new("other-secret").unwrap();
        let nonce = issuer().issue_at("s", "a", NOW);
        assert!(!other.verify_at(&nonce, "s", "a", NOW));
    }

    #[test]
    fn malformed_nonce_is_rejected() {
        let issuer = issuer();
        assert!(!issuer.verify_at("zz".repeat(10).as_str(), "s", "a", NOW));
        assert!(!issuer.verify_at("", "s", "a", NOW));
    }

    #[test]
    fn rejects_blank_secret() {
        assert!(matches!(NonceIssuer::new("  "), Err(NonceError::Config { .. })));
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", issuer());
        assert!(!rendered.contains("test-secret"));
    }
}
