//! Pure transforms that turn an admitted URL sequence into a numbered cache.
//!
//! A build runs them in order: [`dedup_by_url`], [`number`], then
//! [`drop_excluded_and_renumber`]. Each output has IDs `1..=len` with no gaps.

use std::collections::HashSet;

use crate::domain::entities::{CacheEntry, EntryId, IdExclusions, UrlExclusions};

/// Removes repeated URLs, keeping the first occurrence.
#[must_use]
pub fn dedup_by_url(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Assigns IDs `1..=N` in sequence order.
#[must_use]
pub fn number(urls: Vec<String>) -> Vec<CacheEntry> {
    urls.into_iter()
        .enumerate()
        .map(|(index, url)| CacheEntry {
            id: EntryId::from_position(index),
            url,
        })
        .collect()
}

/// A pending ID exclusion together with the URL that was deleted under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeletion<'a> {
    /// Position the entry held in the committed cache.
    pub id: EntryId,
    /// URL that sat at that position.
    pub url: &'a str,
}

/// Pairs every pending ID exclusion with the URL deleted under it.
///
/// A soft delete grows both lists by one, so the newest `ids.len()` URL
/// exclusions line up with the IDs in order. Leading IDs without a URL
/// counterpart are left unpaired.
#[must_use]
pub fn pending_deletions<'a>(
    ids: &IdExclusions,
    urls: &'a UrlExclusions,
) -> Vec<PendingDeletion<'a>> {
    let recent = urls.newest(ids.len());
    ids.iter()
        .skip(ids.len() - recent.len())
        .zip(recent)
        .map(|(id, url)| PendingDeletion {
            id: *id,
            url: url.as_str(),
        })
        .collect()
}

/// Drops deleted entries, then numbers the rest `1..=M`.
///
/// An entry goes when its URL is excluded, or when its freshly assigned ID is
/// a pending deletion whose URL is the one now at that position. An ID whose
/// position is held by some other URL drops nothing.
#[must_use]
pub fn drop_excluded_and_renumber(
    entries: Vec<CacheEntry>,
    pending: &[PendingDeletion<'_>],
    excluded_urls: &UrlExclusions,
) -> Vec<CacheEntry> {
    let kept = entries
        .into_iter()
        .filter(|entry| {
            !pending
                .iter()
                .any(|deletion| deletion.id == entry.id && deletion.url == entry.url)
        })
        .filter(|entry| !excluded_urls.contains_url(&entry.url))
        .map(|entry| entry.url)
        .collect();
    number(kept)
}

/// ID for the next appended entry: one past the current maximum.
///
/// IDs deleted since the last build still count, so a deleted ID is never
/// handed out again before the rebuild that retires it.
#[must_use]
pub fn next_id(entries: &[CacheEntry], deleted: &IdExclusions) -> EntryId {
    entries
        .iter()
        .map(|entry| entry.id)
        .chain(deleted.iter().copied())
        .max()
        .map_or(EntryId::FIRST, EntryId::next)
}

/// Highest ID in the cache, if any.
#[must_use]
pub fn max_id(entries: &[CacheEntry]) -> Option<EntryId> {
    entries.iter().map(|entry| entry.id).max()
}

/// Returns true if IDs are exactly `1..=len` in order and URLs are unique.
#[must_use]
pub fn is_contiguous(entries: &[CacheEntry]) -> bool {
    let mut urls = HashSet::with_capacity(entries.len());
    entries
        .iter()
        .enumerate()
        .all(|(index, entry)| entry.id == EntryId::from_position(index) && urls.insert(&entry.url))
}
