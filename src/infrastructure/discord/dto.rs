use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::entities::{Attachment, Embed, EmbedImage, Message, MessageAuthor};

/// Discord API message author structure.
#[derive(Debug, Deserialize)]
pub struct AuthorResponse {
    /// Discord user ID.
    pub id: String,
    /// Discord username.
    pub username: String,
    /// Whether the user is a bot.
    #[serde(default)]
    pub bot: bool,
}

/// Discord API attachment structure.
#[derive(Debug, Deserialize)]
pub struct AttachmentResponse {
    pub id: String,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Discord API embed image structure.
#[derive(Debug, Deserialize)]
pub struct EmbedImageResponse {
    pub url: String,
}

/// Discord API embed structure. Only the fields used for media lookup.
#[derive(Debug, Deserialize)]
pub struct EmbedResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<EmbedImageResponse>,
}

/// Discord API message structure.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    /// Message snowflake.
    pub id: String,
    pub author: AuthorResponse,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<AttachmentResponse>,
    #[serde(default)]
    pub embeds: Vec<EmbedResponse>,
}

impl From<MessageResponse> for Message {
    fn from(response: MessageResponse) -> Self {
        let attachments = response
            .attachments
            .into_iter()
            .map(|a| {
                let attachment = Attachment::new(a.id, a.filename, a.url);
                match a.content_type {
                    Some(content_type) => attachment.with_content_type(content_type),
                    None => attachment,
                }
            })
            .collect();

        let embeds = response
            .embeds
            .into_iter()
            .map(|e| Embed {
                url: e.url,
                image: e.image.map(|image| EmbedImage { url: image.url }),
            })
            .collect();

        Message::new(
            response.id.as_str(),
            MessageAuthor::new(
                response.author.id,
                response.author.username,
                response.author.bot,
            ),
            response.content,
            response.timestamp,
        )
        .with_attachments(attachments)
        .with_embeds(embeds)
    }
}

/// Discord API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from Discord.
    pub message: String,
    /// Seconds to wait when rate limited.
    #[serde(default)]
    pub retry_after: Option<f64>,
}
