//! URL verification error types.

use thiserror::Error;

/// Reasons a candidate URL failed its existence check.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum VerifyError {
    #[error("not a fetchable url: {url}")]
    InvalidUrl { url: String },

    #[error("request failed: {message}")]
    Request { message: String },

    #[error("HEAD request returned {status}")]
    Status { status: u16 },
}
