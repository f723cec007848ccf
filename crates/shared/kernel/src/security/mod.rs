//! Request security helpers.

mod nonce;

pub use nonce::{NonceError, NonceErrorExt, NonceIssuer};
