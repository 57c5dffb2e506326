//! Media URL extraction from messages.


use regex::Regex;
use std::sync::LazyLock;

use crate::domain::entities::Message;

const GALLERY_HOST: &str = "www.pixiv.net";
const GALLERY_MIRROR_HOST: &str = "www.phixiv.net";

/// A single extraction rule. Returns a candidate URL or `None` to defer.
type Matcher = fn(&Message) -> Option<String>;

/// Rules tried after native attachments, highest priority first.
const FALLBACK_MATCHERS: &[Matcher] = &[gallery_link, embed_image, social_post_link];

/// Finds the media URLs a message carries.
///
/// Attachments come first. The fallback rules cover a gallery link rewritten
/// to its mirror host, the first embed image, and a social post link.
pub struct UrlExtractor;

impl UrlExtractor {
    /// Returns the single best candidate URL of a message.
    #[must_use]
    pub fn extract(message: &Message) -> Option<String> {
        first_attachment(message).or_else(|| Self::extract_fallback(message))
    }

    /// Returns the first match of the embed and text rules, skipping attachments.
    #[must_use]
    pub fn extract_fallback(message: &Message) -> Option<String> {
        FALLBACK_MATCHERS.iter().find_map(|matcher| matcher(message))
    }

    /// Returns every attachment URL in order, followed by the fallback match.
    #[must_use]
    pub fn candidates(message: &Message) -> Vec<String> {
        let mut urls: Vec<String> = message
            .attachments()
            .iter()
            .map(|attachment| attachment.url().to_owned())
            .collect();

        if let Some(url) = Self::extract_fallback(message) {
            urls.push(url);
        }

        urls
    }
}

fn first_attachment(message: &Message) -> Option<String> {
    message
        .attachments()
        .first()
        .map(|attachment| attachment.url().to_owned())
}

fn gallery_link(message: &Message) -> Option<String> {
    static GALLERY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"https://www\.pixiv\.net/en/artworks/\d+").expect("gallery pattern is valid")
    });

    let url = message.primary_embed()?.url.as_deref()?;
    GALLERY_RE
        .is_match(url)
        .then(|| url.replacen(GALLERY_HOST, GALLERY_MIRROR_HOST, 1))
}

fn embed_image(message: &Message) -> Option<String> {
    message
        .primary_embed()?
        .image_url()
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
}

fn social_post_link(message: &Message) -> Option<String> {
    static SOCIAL_POST_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"https://fxtwitter\.com/\w+/status/\d+").expect("post pattern is valid")
    });

    let content = message.content();
    if !content.contains("http") {
        return None;
    }

    SOCIAL_POST_RE
        .find(content)
        .map(|found| found.as_str().to_owned())
}
