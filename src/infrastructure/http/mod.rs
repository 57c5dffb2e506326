//! HTTP adapters.

mod verifier;

pub use verifier::{DEFAULT_VERIFY_TIMEOUT, HttpUrlVerifier};
