//! Discord REST client for reading channel history.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

use super::dto::{ErrorResponse, MessageResponse};
use crate::domain::entities::{Message, MessageId};
use crate::domain::errors::SourceError;
use crate::domain::ports::{FetchMessagesOptions, MessageSourcePort};

/// Default Discord REST endpoint.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/linuxmobile/curator, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Reads messages of one channel with a bot token.
pub struct DiscordClient {
    client: Client,
    base_url: String,
    channel_id: u64,
    token: String,
}

impl DiscordClient {
    /// Creates new client with default base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(token: impl Into<String>, channel_id: u64) -> Result<Self, SourceError> {
        Self::with_base_url(DISCORD_API_BASE, token, channel_id)
    }

    /// Creates client with custom base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        channel_id: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            channel_id,
            token: token.into(),
        })
    }

    /// Returns the channel this client reads.
    #[must_use]
    pub const fn channel_id(&self) -> u64 {
        self.channel_id
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.base_url, self.channel_id)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response, SourceError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(header::AUTHORIZATION, format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to connect to Discord API");
                if e.is_timeout() {
                    SourceError::network("request timed out")
                } else if e.is_connect() {
                    SourceError::network("failed to connect to Discord")
                } else {
                    SourceError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(self.handle_error_response(status, response).await)
        }
    }

    async fn handle_error_response(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> SourceError {
        let error = response.json::<ErrorResponse>().await.ok();
        let error_message = error
            .as_ref()
            .map_or_else(|| format!("HTTP {status}"), |e| e.message.clone());

        match status {
            StatusCode::NOT_FOUND => SourceError::ChannelNotFound {
                channel_id: self.channel_id,
            },
            StatusCode::UNAUTHORIZED => SourceError::unauthorized("invalid bot token"),
            StatusCode::FORBIDDEN => {
                SourceError::unauthorized(format!("access denied: {error_message}"))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_ms = error
                    .and_then(|e| e.retry_after)
                    .map_or(5000, |secs| (secs * 1000.0).ceil() as u64);
                SourceError::RateLimited { retry_after_ms }
            }
            s if s.is_server_error() => SourceError::network("Discord API is temporarily unavailable"),
            _ => SourceError::unexpected(format!("unexpected response: {status} - {error_message}")),
        }
    }
}

#[async_trait]
impl MessageSourcePort for DiscordClient {
    async fn fetch_messages(
        &self,
        options: FetchMessagesOptions,
    ) -> Result<Vec<Message>, SourceError> {
        let mut query = vec![("limit", options.effective_limit().to_string())];
        if let Some(before) = options.before {
            query.push(("before", before.to_string()));
        }

        debug!(channel_id = self.channel_id, before = ?options.before, "Fetching message page");

        let response = self.get(&self.messages_url(), &query).await?;
        let messages: Vec<MessageResponse> = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse messages response");
            SourceError::invalid_response(format!("failed to parse messages: {e}"))
        })?;

        Ok(messages.into_iter().map(Message::from).collect())
    }

    async fn fetch_message(&self, message_id: MessageId) -> Result<Message, SourceError> {
        let url = format!("{}/{}", self.messages_url(), message_id);
        let response = self.get(&url, &[]).await?;
        let message: MessageResponse = response.json().await.map_err(|e| {
            SourceError::invalid_response(format!("failed to parse message: {e}"))
        })?;

        Ok(message.into())
    }
}
