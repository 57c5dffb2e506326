//! Message source error types.

use thiserror::Error;

/// Failures while reading channel history.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum SourceError {
    #[error("channel {channel_id} not found")]
    ChannelNotFound { channel_id: u64 },

    #[error("message source rejected credentials: {message}")]
    Unauthorized { message: String },

    #[error("rate limited by Discord, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("network error while fetching messages: {message}")]
    Network { message: String },

    #[error("invalid response from message source: {message}")]
    InvalidResponse { message: String },

    #[error("unexpected message source error: {message}")]
    Unexpected { message: String },
}

impl SourceError {
    /// Creates unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether retrying later might succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::RateLimited { .. })
    }
}
