//! Cache persistence port definition.

use async_trait::async_trait;

use crate::domain::entities::{CacheEntry, IdExclusions, UrlExclusions};
use crate::domain::errors::StoreError;

/// The three durable collections behind the media cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Active cache entries.
    Entries,
    /// URLs excluded from every future build.
    ExcludedUrls,
    /// Sequence numbers to drop on the next rebuild.
    ExcludedIds,
}

impl CollectionKind {
    /// File name used by file-backed stores.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Entries => "media_cache.json",
            Self::ExcludedUrls => "excluded_urls.json",
            Self::ExcludedIds => "excluded_ids.json",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entries => write!(f, "cache entries"),
            Self::ExcludedUrls => write!(f, "url exclusions"),
            Self::ExcludedIds => write!(f, "id exclusions"),
        }
    }
}

/// Port for loading and saving the cache collections.
///
/// Loading a collection that was never saved yields an empty collection.
/// Saving replaces the whole collection. There is no transaction across
/// collections; callers order their writes.
#[async_trait]
pub trait CacheStorePort: Send + Sync {
    /// Loads the active cache entries.
    async fn load_entries(&self) -> Result<Vec<CacheEntry>, StoreError>;

    /// Replaces the active cache entries.
    async fn save_entries(&self, entries: &[CacheEntry]) -> Result<(), StoreError>;

    /// Loads the URL exclusion list.
    async fn load_url_exclusions(&self) -> Result<UrlExclusions, StoreError>;

    /// Replaces the URL exclusion list.
    async fn save_url_exclusions(&self, exclusions: &UrlExclusions) -> Result<(), StoreError>;

    /// Loads the ID exclusion list.
    async fn load_id_exclusions(&self) -> Result<IdExclusions, StoreError>;

    /// Replaces the ID exclusion list.
    async fn save_id_exclusions(&self, exclusions: &IdExclusions) -> Result<(), StoreError>;

    /// Returns true once a cache snapshot has been committed.
    async fn has_entries(&self) -> Result<bool, StoreError>;
}
