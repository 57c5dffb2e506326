//! Point and random lookups plus soft deletion.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::application::dto::{CacheStatus, EntryLookup};
use crate::application::services::{BuildGate, CacheWriteLock};
use crate::domain::entities::{CacheEntry, EntryId};
use crate::domain::errors::CacheError;
use crate::domain::ports::CacheStorePort;
use crate::domain::services::renumbering;

/// Reads and retracts entries of the committed cache.
///
/// Every call reloads from the store; nothing is cached between calls.
#[derive(Clone)]
pub struct QueryCacheUseCase {
    store: Arc<dyn CacheStorePort>,
    write_lock: CacheWriteLock,
    gate: BuildGate,
}

impl QueryCacheUseCase {
    /// Creates new query use case.
    #[must_use]
    pub const fn new(
        store: Arc<dyn CacheStorePort>,
        write_lock: CacheWriteLock,
        gate: BuildGate,
    ) -> Self {
        Self {
            store,
            write_lock,
            gate,
        }
    }

    /// Picks a uniformly random entry that is not pending deletion.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn get_random(&self) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.store.load_entries().await?;
        let deleted = self.store.load_id_exclusions().await?;

        let available: Vec<&CacheEntry> = entries
            .iter()
            .filter(|entry| !deleted.contains(&entry.id))
            .collect();

        Ok(available.choose(&mut rand::rng()).map(|entry| (*entry).clone()))
    }

    /// Looks up an entry by ID.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn get_by_id(&self, id: EntryId) -> Result<Option<CacheEntry>, CacheError> {
        self.lookup(id).await.map(EntryLookup::into_entry)
    }

    /// Looks up an entry by ID, telling deleted IDs apart from unknown ones.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn lookup(&self, id: EntryId) -> Result<EntryLookup, CacheError> {
        let deleted = self.store.load_id_exclusions().await?;
        if deleted.contains(&id) {
            debug!(id = %id, "Requested id is pending deletion");
            return Ok(EntryLookup::PendingDeletion);
        }

        let entries = self.store.load_entries().await?;
        let in_range = renumbering::max_id(&entries).is_some_and(|max| id >= EntryId::FIRST && id <= max);
        if !in_range {
            return Ok(EntryLookup::Invalid);
        }

        Ok(entries
            .into_iter()
            .find(|entry| entry.id == id)
            .map_or(EntryLookup::Invalid, EntryLookup::Found))
    }

    /// Removes an entry and excludes its URL from every future build.
    ///
    /// Remaining entries keep their IDs until the next rebuild.
    ///
    /// # Errors
    /// Returns `NotFound` if no entry has `id`, or a storage error.
    pub async fn soft_delete(&self, id: EntryId) -> Result<CacheEntry, CacheError> {
        let _write = self.write_lock.acquire().await;

        let mut entries = self.store.load_entries().await?;
        let Some(position) = entries.iter().position(|entry| entry.id == id) else {
            return Err(CacheError::NotFound { id });
        };

        let mut url_exclusions = self.store.load_url_exclusions().await?;
        if url_exclusions.insert(entries[position].url.clone()) {
            self.store.save_url_exclusions(&url_exclusions).await?;
        }

        let mut id_exclusions = self.store.load_id_exclusions().await?;
        if id_exclusions.insert(id) {
            self.store.save_id_exclusions(&id_exclusions).await?;
        }

        let removed = entries.remove(position);
        self.store.save_entries(&entries).await?;

        info!(id = %removed.id, url = %removed.url, "Media marked for deletion");
        Ok(removed)
    }

    /// Summarizes the persisted collections.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn status(&self) -> Result<CacheStatus, CacheError> {
        Ok(CacheStatus {
            entries: self.store.load_entries().await?.len(),
            excluded_urls: self.store.load_url_exclusions().await?.len(),
            pending_id_exclusions: self.store.load_id_exclusions().await?.len(),
            building: self.gate.is_building(),
        })
    }
}
