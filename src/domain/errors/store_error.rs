//! Persistence error types.

use thiserror::Error;

use crate::domain::ports::CollectionKind;

/// Failures while loading or saving a persisted collection.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("io error on {kind}: {source}")]
    Io {
        kind: CollectionKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} file is not valid JSON: {source}")]
    Corrupt {
        kind: CollectionKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: CollectionKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Returns the collection the error relates to, if known.
    #[must_use]
    pub const fn kind(&self) -> Option<CollectionKind> {
        match self {
            Self::Io { kind, .. } | Self::Corrupt { kind, .. } | Self::Encode { kind, .. } => {
                Some(*kind)
            }
            Self::Task(_) => None,
        }
    }
}
