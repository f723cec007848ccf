//! Cookie-bound visitor sessions.
//!
//! Session data lives in a bounded `moka` cache that expires idle sessions. The
//! request-scoped [`SessionHandle`] is what the registration pipeline sees as its
//! session store, login target and nonce verifier.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use fxhash::FxHashMap;
use lms::domain::config::SecurityConfig;
use lms::domain::constants::REGISTRATION_SESSION_PREFIX;
use lms::domain::ids::UserId;
use lms::features::registration::context::CollaboratorError;
use lms::features::registration::{AuthSessions, NonceVerifier, SessionStore};
use lms::kernel::safe_nanoid;
use lms::kernel::security::NonceIssuer;
use moka::sync::Cache;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SESSION_ID_LEN: usize = 32;

#[derive(Debug, Default)]
pub struct SessionData {
    values: Mutex<FxHashMap<String, String>>,
    user: Mutex<Option<UserId>>,
}

impl SessionData {
    #[must_use]
    pub fn user(&self) -> Option<UserId> {
        *self.user.lock()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Removes and returns the stashed registration fields, keyed by form field name.
    pub fn take_replay(&self) -> BTreeMap<String, String> {
        let prefix = format!("{REGISTRATION_SESSION_PREFIX}.");
        let mut values = self.values.lock();
        let keys: Vec<String> = values.keys().filter(|k| k.starts_with(&prefix)).cloned().collect();
        keys.into_iter()
            .filter_map(|key| {
                let value = values.remove(&key)?;
                Some((key[prefix.len()..].to_owned(), value))
            })
            .collect()
    }
}

/// Process-wide session table.
#[derive(Debug, Clone)]
pub struct Sessions {
    cache: Cache<String, Arc<SessionData>>,
    cookie: String,
    nonces: NonceIssuer,
}

impl Sessions {
    #[must_use]
    pub fn new(config: &SecurityConfig, nonces: NonceIssuer) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.session_cache_capacity)
            .time_to_idle(Duration::from_secs(config.session_ttl_seconds))
            .build();
        Self { cache, cookie: config.session_cookie.clone(), nonces }
    }

    /// Returns the visitor's session, starting a new one (and setting its cookie)
    /// when the cookie is absent or the session expired.
    #[must_use]
    pub fn resolve(&self, jar: CookieJar) -> (CookieJar, SessionHandle) {
        if let Some(id) = jar.get(&self.cookie).map(|c| c.value().to_owned())
            && let Some(data) = self.cache.get(&id)
        {
            return (jar, self.handle(id, data));
        }

        let id = safe_nanoid!(SESSION_ID_LEN);
        let data = Arc::new(SessionData::default());
        self.cache.insert(id.clone(), Arc::clone(&data));
        debug!("Session started");

        let cookie = Cookie::build((self.cookie.clone(), id.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        (jar.add(cookie), self.handle(id, data))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<SessionData>> {
        self.cache.get(id)
    }

    fn handle(&self, id: String, data: Arc<SessionData>) -> SessionHandle {
        SessionHandle { id, data, nonces: self.nonces.clone() }
    }
}

/// One visitor's session for the duration of a request.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: String,
    data: Arc<SessionData>,
    nonces: NonceIssuer,
}

impl SessionHandle {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Nonce for `action`, bound to this session.
    ///
    /// # Errors
    /// Returns the issuer error if the clock is unusable.
    pub fn nonce(&self, action: &str) -> Result<String, lms::kernel::security::NonceError> {
        self.nonces.issue(&self.id, action)
    }
}

impl SessionStore for SessionHandle {
    fn put(&self, key: &str, value: &str) {
        self.data.values.lock().insert(key.to_owned(), value.to_owned());
    }
}

impl AuthSessions for SessionHandle {
    fn login(&self, user: UserId) -> Result<(), CollaboratorError> {
        *self.data.user.lock() = Some(user);
        debug!(user_id = %user, "Session authenticated");
        Ok(())
    }
}

impl NonceVerifier for SessionHandle {
    fn verify(&self, token: &str, action: &str) -> bool {
        self.nonces.verify(token, &self.id, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> Sessions {
        Sessions::new(&SecurityConfig::default(), NonceIssuer::new("test-secret").unwrap())
    }

    #[test]
    fn new_visitor_gets_a_cookie_and_is_recognized_later() {
        let sessions = sessions();
        let (jar, handle) = sessions.resolve(CookieJar::new());
        let cookie = jar.get("lms_session").unwrap().value().to_owned();
        assert_eq!(cookie, handle.id());

        let (_, again) = sessions.resolve(jar);
        assert_eq!(again.id(), handle.id());
    }

    #[test]
    fn unknown_cookie_starts_a_new_session() {
        let sessions = sessions();
        let jar = CookieJar::new().add(Cookie::new("lms_session", "stale"));
        let (_, handle) = sessions.resolve(jar);
        assert_ne!(handle.id(), "stale");
    }

    #[test]
    fn nonce_verifies_only_for_its_session() {
        let sessions = sessions();
        let (_, a) = sessions.resolve(CookieJar::new());
        let (_, b) = sessions.resolve(CookieJar::new());
        let nonce = a.nonce("lms-register").unwrap();

        assert!(a.verify(&nonce, "lms-register"));
        assert!(!b.verify(&nonce, "lms-register"));
    }

    #[test]
    fn replay_is_taken_once() {
        let (_, handle) = sessions().resolve(CookieJar::new());
        handle.put("user-registration.email", "ada@school.test");
        handle.put("other", "kept");

        let replay = handle.data().take_replay();
        assert_eq!(replay.get("email").map(String::as_str), Some("ada@school.test"));
        assert!(handle.data().take_replay().is_empty());
        assert_eq!(handle.data().get("other").as_deref(), Some("kept"));
    }
}
