//! HTTP existence check for candidate media URLs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::warn;

use crate::domain::errors::VerifyError;
use crate::domain::ports::UrlVerifierPort;

const USER_AGENT: &str = concat!("curator/", env!("CARGO_PKG_VERSION"));

/// Default check timeout.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies URLs with a `HEAD` request.
pub struct HttpUrlVerifier {
    client: Client,
}

impl HttpUrlVerifier {
    /// Creates a verifier with the default timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, VerifyError> {
        Self::with_timeout(DEFAULT_VERIFY_TIMEOUT)
    }

    /// Creates a verifier with a custom timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_timeout(timeout: Duration) -> Result<Self, VerifyError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VerifyError::Request {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }

    /// Sends a `HEAD` request and reports why the URL is unusable.
    ///
    /// # Errors
    /// Returns the reason the URL is not currently fetchable.
    pub async fn check(&self, url: &str) -> Result<(), VerifyError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| VerifyError::InvalidUrl {
            url: url.to_owned(),
        })?;

        let response = self.client.head(parsed).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out".to_owned()
            } else if e.is_connect() {
                "failed to connect".to_owned()
            } else {
                e.to_string()
            };
            VerifyError::Request { message }
        })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(VerifyError::Status {
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl UrlVerifierPort for HttpUrlVerifier {
    async fn verify(&self, url: &str) -> bool {
        match self.check(url).await {
            Ok(()) => true,
            Err(e) => {
                warn!(url = %url, error = %e, "URL verification failed");
                false
            }
        }
    }
}
