//! Message source port for reading channel history.

use async_trait::async_trait;

use crate::domain::entities::{Message, MessageId};
use crate::domain::errors::SourceError;

/// Largest page the Discord API hands out.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Options for fetching one page of messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchMessagesOptions {
    /// Page size, at most [`MAX_PAGE_SIZE`].
    pub limit: Option<u8>,
    /// Only return messages older than this one.
    pub before: Option<MessageId>,
}

impl FetchMessagesOptions {
    /// Sets the page size, capped at [`MAX_PAGE_SIZE`].
    #[must_use]
    pub const fn with_limit(mut self, limit: u8) -> Self {
        self.limit = Some(if limit < MAX_PAGE_SIZE {
            limit
        } else {
            MAX_PAGE_SIZE
        });
        self
    }

    /// Continues pagination below `message_id`.
    #[must_use]
    pub const fn before_message(mut self, message_id: MessageId) -> Self {
        self.before = Some(message_id);
        self
    }

    /// Effective page size sent to the source.
    #[must_use]
    pub const fn effective_limit(&self) -> u8 {
        match self.limit {
            Some(limit) => limit,
            None => MAX_PAGE_SIZE,
        }
    }
}

/// Port for reading the history of the configured media channel.
#[async_trait]
pub trait MessageSourcePort: Send + Sync {
    /// Fetches one page of messages, newest first.
    async fn fetch_messages(
        &self,
        options: FetchMessagesOptions,
    ) -> Result<Vec<Message>, SourceError>;

    /// Fetches a single message by id.
    async fn fetch_message(&self, message_id: MessageId) -> Result<Message, SourceError>;
}
