//! Media cache DTOs.

use crate::domain::entities::CacheEntry;

/// Result of a full cache build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The snapshot was committed with `count` entries.
    Completed {
        /// Entries in the committed cache.
        count: usize,
    },
    /// Pagination failed; nothing was committed.
    Aborted {
        /// Items admitted before the failure.
        partial: usize,
        /// Why the message source stopped answering.
        reason: String,
        /// Whether the failure is transient and a later rebuild may succeed.
        retryable: bool,
    },
    /// Another build was already running.
    Rejected,
}

impl BuildOutcome {
    /// Number of items the build ended with (committed or not).
    #[must_use]
    pub const fn count(&self) -> usize {
        match self {
            Self::Completed { count } => *count,
            Self::Aborted { partial, .. } => *partial,
            Self::Rejected => 0,
        }
    }

    /// Returns true if a new snapshot was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Result of offering one new message to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The media was admitted under a new ID.
    Added(CacheEntry),
    /// The message carried no recognizable media.
    NoCandidate,
    /// The candidate URL did not pass the existence check.
    Unverified,
    /// The URL is already cached.
    Duplicate,
    /// The URL was soft-deleted earlier.
    Excluded,
    /// Bot-authored messages are not harvested.
    IgnoredBot,
}

/// Result of looking up one ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLookup {
    /// The entry is live.
    Found(CacheEntry),
    /// The ID was deleted and waits for the next rebuild.
    PendingDeletion,
    /// The ID is out of range or unused.
    Invalid,
}

impl EntryLookup {
    /// Returns the entry if it was found.
    #[must_use]
    pub fn into_entry(self) -> Option<CacheEntry> {
        match self {
            Self::Found(entry) => Some(entry),
            Self::PendingDeletion | Self::Invalid => None,
        }
    }
}

/// Snapshot of cache bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    /// Entries in the active cache.
    pub entries: usize,
    /// URLs excluded permanently.
    pub excluded_urls: usize,
    /// IDs waiting for the next rebuild.
    pub pending_id_exclusions: usize,
    /// Whether a build is currently running.
    pub building: bool,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cached, {} excluded urls, {} pending id exclusions{}",
            self.entries,
            self.excluded_urls,
            self.pending_id_exclusions,
            if self.building { ", build running" } else { "" }
        )
    }
}
