//! URL verifier port definition.

use async_trait::async_trait;

/// Port for checking that a candidate media URL is currently fetchable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlVerifierPort: Send + Sync {
    /// Returns true only when the resource answered with an explicit success.
    /// Never fails: anything unverifiable is reported as `false`.
    async fn verify(&self, url: &str) -> bool;
}
