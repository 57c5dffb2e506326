//! Flat-file JSON implementation of the cache store.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, info};

use crate::domain::entities::{CacheEntry, IdExclusions, UrlExclusions};
use crate::domain::errors::StoreError;
use crate::domain::ports::{CacheStorePort, CollectionKind};

/// Stores each collection as one pretty-printed JSON document in a directory.
#[derive(Debug, Clone)]
pub struct JsonCacheStore {
    dir: PathBuf,
}

impl JsonCacheStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `kind`.
    #[must_use]
    pub fn path_for(&self, kind: CollectionKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    async fn load<T>(&self, kind: CollectionKind) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path_for(kind);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(collection = %kind, path = %path.display(), "File does not exist, starting empty");
                return Ok(T::default());
            }
            Err(source) => return Err(StoreError::Io { kind, source }),
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt { kind, source })
    }

    async fn save<T>(&self, kind: CollectionKind, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let content =
            serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode { kind, source })?;
        let dir = self.dir.clone();
        let path = self.path_for(kind);

        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, content.as_bytes()))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
            .map_err(|source| StoreError::Io { kind, source })?;

        debug!(collection = %kind, "Saved collection");
        Ok(())
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
    temp_file.write_all(bytes)?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl CacheStorePort for JsonCacheStore {
    async fn load_entries(&self) -> Result<Vec<CacheEntry>, StoreError> {
        self.load(CollectionKind::Entries).await
    }

    async fn save_entries(&self, entries: &[CacheEntry]) -> Result<(), StoreError> {
        self.save(CollectionKind::Entries, entries).await
    }

    async fn load_url_exclusions(&self) -> Result<UrlExclusions, StoreError> {
        self.load(CollectionKind::ExcludedUrls).await
    }

    async fn save_url_exclusions(&self, exclusions: &UrlExclusions) -> Result<(), StoreError> {
        self.save(CollectionKind::ExcludedUrls, exclusions).await
    }

    async fn load_id_exclusions(&self) -> Result<IdExclusions, StoreError> {
        self.load(CollectionKind::ExcludedIds).await
    }

    async fn save_id_exclusions(&self, exclusions: &IdExclusions) -> Result<(), StoreError> {
        self.save(CollectionKind::ExcludedIds, exclusions).await
    }

    async fn has_entries(&self) -> Result<bool, StoreError> {
        fs::try_exists(self.path_for(CollectionKind::Entries))
            .await
            .map_err(|source| StoreError::Io {
                kind: CollectionKind::Entries,
                source,
            })
    }
}
