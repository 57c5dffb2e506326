//! Media cache error types.

use thiserror::Error;

use super::StoreError;
use crate::domain::entities::EntryId;

/// Errors surfaced by cache queries and mutations.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CacheError {
    #[error("no cache entry with id {id}")]
    NotFound { id: EntryId },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
