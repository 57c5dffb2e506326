//! Incremental append use case.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::dto::AppendOutcome;
use crate::application::services::{CacheWriteLock, UrlExtractor};
use crate::domain::entities::{CacheEntry, Message};
use crate::domain::errors::CacheError;
use crate::domain::ports::{CacheStorePort, UrlVerifierPort};
use crate::domain::services::renumbering;

/// Admits the media of one newly posted message without a full rebuild.
#[derive(Clone)]
pub struct AppendMediaUseCase {
    verifier: Arc<dyn UrlVerifierPort>,
    store: Arc<dyn CacheStorePort>,
    write_lock: CacheWriteLock,
}

impl AppendMediaUseCase {
    /// Creates new append use case.
    #[must_use]
    pub const fn new(
        verifier: Arc<dyn UrlVerifierPort>,
        store: Arc<dyn CacheStorePort>,
        write_lock: CacheWriteLock,
    ) -> Self {
        Self {
            verifier,
            store,
            write_lock,
        }
    }

    /// Offers a message to the cache.
    ///
    /// # Errors
    /// Returns error if the store cannot be read or written.
    pub async fn execute(&self, message: &Message) -> Result<AppendOutcome, CacheError> {
        if message.author().is_bot() {
            return Ok(AppendOutcome::IgnoredBot);
        }

        let Some(url) = UrlExtractor::extract(message) else {
            return Ok(AppendOutcome::NoCandidate);
        };

        if !self.verifier.verify(&url).await {
            debug!(url = %url, message_id = %message.id(), "Appended candidate failed verification");
            return Ok(AppendOutcome::Unverified);
        }

        let _write = self.write_lock.acquire().await;

        if self.store.load_url_exclusions().await?.contains_url(&url) {
            debug!(url = %url, "Refusing excluded url");
            return Ok(AppendOutcome::Excluded);
        }

        let mut entries = self.store.load_entries().await?;
        if entries.iter().any(|entry| entry.url == url) {
            debug!(url = %url, "Url already cached");
            return Ok(AppendOutcome::Duplicate);
        }

        let deleted = self.store.load_id_exclusions().await?;
        let entry = CacheEntry {
            id: renumbering::next_id(&entries, &deleted),
            url,
        };
        entries.push(entry.clone());
        self.store.save_entries(&entries).await?;

        info!(id = %entry.id, url = %entry.url, "Added media to cache");
        Ok(AppendOutcome::Added(entry))
    }
}
