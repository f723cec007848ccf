//! Plumbing every LMS slice leans on: configuration loading, short ids, CSRF
//! nonces and (with the `server` feature) the shared Axum state.
//!
//! Session ids and password-reset keys come from [`safe_nanoid!`]:
//! ```rust
//! # use lms_kernel::safe_nanoid;
//! let key = safe_nanoid!(20);
//! assert_eq!(key.len(), 20);
//! assert!(!key.contains(['0', 'O', 'l', '1', 'I']));
//! ```
//!
//! Nonces are bound to a session and an action:
//! ```rust
//! use lms_kernel::security::NonceIssuer;
//!
//! let issuer = NonceIssuer::new("secret")?;
//! let nonce = issuer.issue_at("session-a", "lms-register", 1_000);
//! assert!(issuer.verify_at(&nonce, "session-a", "lms-register", 1_000));
//! assert!(!issuer.verify_at(&nonce, "session-b", "lms-register", 1_000));
//! # Ok::<(), lms_kernel::security::NonceError>(())
//! ```
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod prelude;
pub mod security;
#[cfg(feature = "server")]
pub mod server;

/// Id alphabet without the look-alikes `0 O 1 I l`.
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use lms_domain as domain;
pub use lms_event_bus as events;
pub use nanoid::nanoid;

/// `NanoID` over [`SAFE_ALPHABET`], 12 characters unless a size is given.
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
