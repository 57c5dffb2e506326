//! Full cache build use case.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::application::dto::BuildOutcome;
use crate::application::services::{BuildGate, CacheWriteLock, UrlExtractor};
use crate::domain::entities::{IdExclusions, MessageId, UrlExclusions};
use crate::domain::errors::{CacheError, SourceError};
use crate::domain::ports::{
    CacheStorePort, FetchMessagesOptions, MAX_PAGE_SIZE, MessageSourcePort, UrlVerifierPort,
};
use crate::domain::services::renumbering;

/// Tunables for history scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSettings {
    /// Messages requested per page, capped at 100.
    pub page_size: u8,
    /// Stop once this many items are admitted. `None` scans the whole history.
    pub max_items: Option<usize>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_items: None,
        }
    }
}

/// Ordered URLs gathered by one history scan.
///
/// `admitted` counts verified items only. The sequence may also hold URLs
/// deleted since the last build, kept so the first numbering lines up with
/// the positions the pending ID exclusions refer to.
#[derive(Debug, Default)]
struct Scan {
    sequence: Vec<String>,
    admitted: usize,
}

/// Rebuilds the media cache from the full channel history.
#[derive(Clone)]
pub struct BuildCacheUseCase {
    source: Arc<dyn MessageSourcePort>,
    verifier: Arc<dyn UrlVerifierPort>,
    store: Arc<dyn CacheStorePort>,
    gate: BuildGate,
    write_lock: CacheWriteLock,
    settings: BuildSettings,
}

impl BuildCacheUseCase {
    /// Creates new build use case.
    #[must_use]
    pub fn new(
        source: Arc<dyn MessageSourcePort>,
        verifier: Arc<dyn UrlVerifierPort>,
        store: Arc<dyn CacheStorePort>,
        gate: BuildGate,
        write_lock: CacheWriteLock,
    ) -> Self {
        Self {
            source,
            verifier,
            store,
            gate,
            write_lock,
            settings: BuildSettings::default(),
        }
    }

    /// Overrides the scan settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: BuildSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the cache only if no snapshot has ever been committed.
    ///
    /// # Errors
    /// Returns error if the store cannot be read or written.
    pub async fn initialize(&self) -> Result<Option<BuildOutcome>, CacheError> {
        if self.store.has_entries().await? {
            info!("Cache file already exists, skipping initial cache build");
            return Ok(None);
        }

        info!("Cache file does not exist, building cache");
        self.execute().await.map(Some)
    }

    /// Runs a full build.
    ///
    /// A build already in progress yields [`BuildOutcome::Rejected`] without
    /// touching the store. A message source failure yields
    /// [`BuildOutcome::Aborted`] and leaves the committed cache as it was.
    ///
    /// # Errors
    /// Returns error if the store cannot be read or written.
    pub async fn execute(&self) -> Result<BuildOutcome, CacheError> {
        let Some(_guard) = self.gate.try_begin() else {
            info!("Cache build is already in progress");
            return Ok(BuildOutcome::Rejected);
        };

        info!(stage = 1, "Initializing cache build and fetching messages");
        let url_exclusions = self.store.load_url_exclusions().await?;
        let id_exclusions = self.store.load_id_exclusions().await?;
        debug!(
            excluded_urls = url_exclusions.len(),
            excluded_ids = ?id_exclusions.iter().map(|id| id.as_u32()).collect::<Vec<_>>(),
            "Exclusions loaded"
        );

        let scan = match self.scan(&url_exclusions, &id_exclusions).await {
            Ok(scan) => scan,
            Err((scan, error)) => {
                let retryable = error.is_recoverable();
                warn!(
                    error = %error,
                    partial = scan.admitted,
                    retryable,
                    "Error fetching messages for cache build, discarding partial scan"
                );
                return Ok(BuildOutcome::Aborted {
                    partial: scan.admitted,
                    reason: error.to_string(),
                    retryable,
                });
            }
        };

        self.commit(scan).await
    }

    async fn scan(
        &self,
        url_exclusions: &UrlExclusions,
        id_exclusions: &IdExclusions,
    ) -> Result<Scan, (Scan, SourceError)> {
        let pending = renumbering::pending_deletions(id_exclusions, url_exclusions);
        let mut scan = Scan::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut before: Option<MessageId> = None;
        let mut page = 0_usize;

        'pages: loop {
            if self.budget_reached(scan.admitted) {
                break;
            }

            let mut options = FetchMessagesOptions::default().with_limit(self.settings.page_size);
            if let Some(message_id) = before {
                options = options.before_message(message_id);
            }

            let messages = match self.source.fetch_messages(options).await {
                Ok(messages) => messages,
                Err(error) => return Err((scan, error)),
            };
            if messages.is_empty() {
                break;
            }

            page += 1;
            debug!(
                page,
                messages = messages.len(),
                admitted = scan.admitted,
                "Fetched history page"
            );

            for message in &messages {
                for url in UrlExtractor::candidates(message) {
                    if self.budget_reached(scan.admitted) {
                        break 'pages;
                    }
                    if seen.contains(&url) {
                        continue;
                    }

                    if url_exclusions.contains_url(&url) {
                        if pending.iter().any(|deletion| deletion.url == url) {
                            trace!(url = %url, "Keeping position of deleted url");
                            seen.insert(url.clone());
                            scan.sequence.push(url);
                        }
                        continue;
                    }

                    if !self.verifier.verify(&url).await {
                        debug!(url = %url, message_id = %message.id(), "Candidate failed verification");
                        continue;
                    }

                    seen.insert(url.clone());
                    scan.sequence.push(url);
                    scan.admitted += 1;
                }
            }

            before = messages.last().map(|message| message.id());
        }

        Ok(scan)
    }

    async fn commit(&self, scan: Scan) -> Result<BuildOutcome, CacheError> {
        let _write = self.write_lock.acquire().await;

        // Re-read under the lock so deletions made during the scan still apply.
        let url_exclusions = self.store.load_url_exclusions().await?;
        let id_exclusions = self.store.load_id_exclusions().await?;

        info!(stage = 2, "Removing duplicate urls");
        let sequence = renumbering::dedup_by_url(scan.sequence);

        info!(stage = 3, "Numbering entries in order");
        let numbered = renumbering::number(sequence);
        let numbered_len = numbered.len();

        info!(stage = 4, "Removing entries by excluded id and url, renumbering");
        let pending = renumbering::pending_deletions(&id_exclusions, &url_exclusions);
        let entries = renumbering::drop_excluded_and_renumber(numbered, &pending, &url_exclusions);
        debug!(removed = numbered_len - entries.len(), "Dropped excluded entries");

        info!(stage = 5, "Saving updated cache");
        self.store.save_entries(&entries).await?;

        info!(stage = 6, "Clearing excluded ids");
        self.store.save_id_exclusions(&IdExclusions::new()).await?;

        info!(count = entries.len(), "Finished building the cache");
        Ok(BuildOutcome::Completed {
            count: entries.len(),
        })
    }

    fn budget_reached(&self, admitted: usize) -> bool {
        self.settings
            .max_items
            .is_some_and(|max| max > 0 && admitted >= max)
    }

    /// Returns whether a build is currently running.
    #[must_use]
    pub fn is_building(&self) -> bool {
        self.gate.is_building()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::AppendOutcome;
    use crate::application::use_cases::{AppendMediaUseCase, QueryCacheUseCase};
    use crate::domain::entities::{Attachment, CacheEntry, EntryId, Message, MessageAuthor};
    use crate::domain::ports::CollectionKind;
    use crate::domain::ports::mocks::{MockCacheStore, MockMessageSource, MockUrlVerifierPort};
    use crate::domain::services::renumbering::is_contiguous;
    use async_trait::async_trait;
    use chrono::Utc;

    fn media_message(id: u64, urls: &[&str]) -> Message {
        let attachments = urls
            .iter()
            .enumerate()
            .map(|(i, url)| Attachment::new(i.to_string(), "file.png", *url))
            .collect();
        Message::new(id, MessageAuthor::new("1", "poster", false), "", Utc::now())
            .with_attachments(attachments)
    }

    fn verifier_accepting_all() -> MockUrlVerifierPort {
        let mut verifier = MockUrlVerifierPort::new();
        verifier.expect_verify().returning(|_| true);
        verifier
    }

    fn use_case(
        source: MockMessageSource,
        verifier: MockUrlVerifierPort,
        store: Arc<MockCacheStore>,
    ) -> BuildCacheUseCase {
        BuildCacheUseCase::new(
            Arc::new(source),
            Arc::new(verifier),
            store,
            BuildGate::new(),
            CacheWriteLock::new(),
        )
    }

    #[tokio::test]
    async fn test_empty_history_commits_empty_cache() {
        let store = Arc::new(MockCacheStore::new());
        let builder = use_case(MockMessageSource::empty(), verifier_accepting_all(), store.clone());

        let outcome = builder.execute().await.unwrap();

        assert_eq!(outcome, BuildOutcome::Completed { count: 0 });
        assert!(store.has_entries().await.unwrap());
        assert!(store.load_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entries_follow_arrival_order() {
        let source = MockMessageSource::with_pages(vec![vec![
            media_message(30, &["u1"]),
            media_message(20, &["u2"]),
            media_message(10, &["u3"]),
        ]]);
        let store = Arc::new(MockCacheStore::new());
        let builder = use_case(source, verifier_accepting_all(), store.clone());

        let outcome = builder.execute().await.unwrap();

        assert_eq!(outcome.count(), 3);
        assert_eq!(
            store.load_entries().await.unwrap(),
            vec![
                CacheEntry::new(1, "u1"),
                CacheEntry::new(2, "u2"),
                CacheEntry::new(3, "u3"),
            ]
        );
    }

    #[tokio::test]
    async fn test_pagination_continues_before_last_message() {
        let source = Arc::new(MockMessageSource::with_pages(vec![
            vec![media_message(40, &["u1"]), media_message(30, &["u2"])],
            vec![media_message(20, &["u3"])],
        ]));
        let store = Arc::new(MockCacheStore::new());
        let builder = BuildCacheUseCase::new(
            source.clone(),
            Arc::new(verifier_accepting_all()),
            store.clone(),
            BuildGate::new(),
            CacheWriteLock::new(),
        );

        assert_eq!(builder.execute().await.unwrap().count(), 3);

        let calls = source.calls().await;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].before, None);
        assert_eq!(calls[1].before, Some(MessageId(30)));
        assert_eq!(calls[2].before, Some(MessageId(20)));
        assert!(calls.iter().all(|call| call.limit == Some(100)));
    }

    #[tokio::test]
    async fn test_duplicates_and_unverified_are_dropped() {
        let source = MockMessageSource::with_pages(vec![vec![
            media_message(40, &["u1", "dead"]),
            media_message(30, &["u2"]),
            media_message(20, &["u1"]),
        ]]);
        let mut verifier = MockUrlVerifierPort::new();
        verifier.expect_verify().returning(|url| url != "dead");
        let store = Arc::new(MockCacheStore::new());

        use_case(source, verifier, store.clone()).execute().await.unwrap();

        let entries = store.load_entries().await.unwrap();
        assert_eq!(entries, vec![CacheEntry::new(1, "u1"), CacheEntry::new(2, "u2")]);
        assert!(is_contiguous(&entries));
    }

    #[tokio::test]
    async fn test_rebuild_after_soft_delete_skips_url_and_clears_ids() {
        let source = MockMessageSource::with_pages(vec![vec![
            media_message(30, &["u1"]),
            media_message(20, &["u2"]),
            media_message(10, &["u3"]),
        ]]);
        let store = Arc::new(
            MockCacheStore::with_entries(vec![CacheEntry::new(1, "u1"), CacheEntry::new(3, "u3")])
                .with_exclusions(
                    ["u2".to_string()].into_iter().collect(),
                    [EntryId(2)].into_iter().collect(),
                ),
        );
        let mut verifier = MockUrlVerifierPort::new();
        verifier.expect_verify().returning(|url| {
            assert_ne!(url, "u2", "deleted urls are never verified");
            true
        });

        let outcome = use_case(source, verifier, store.clone()).execute().await.unwrap();

        assert_eq!(outcome, BuildOutcome::Completed { count: 2 });
        assert_eq!(
            store.load_entries().await.unwrap(),
            vec![CacheEntry::new(1, "u1"), CacheEntry::new(2, "u3")]
        );
        assert!(store.load_id_exclusions().await.unwrap().is_empty());
        assert!(store.load_url_exclusions().await.unwrap().contains_url("u2"));
    }

    #[tokio::test]
    async fn test_old_url_exclusions_do_not_shift_positions() {
        // "u0" was retired by an earlier build; only "u2" (old ID 2) is pending.
        let source = MockMessageSource::with_pages(vec![vec![
            media_message(40, &["u0"]),
            media_message(30, &["u1"]),
            media_message(20, &["u2"]),
            media_message(10, &["u3"]),
        ]]);
        let store = Arc::new(MockCacheStore::new().with_exclusions(
            ["u0".to_string(), "u2".to_string()].into_iter().collect(),
            [EntryId(2)].into_iter().collect(),
        ));

        use_case(source, verifier_accepting_all(), store.clone())
            .execute()
            .await
            .unwrap();

        assert_eq!(
            store.load_entries().await.unwrap(),
            vec![CacheEntry::new(1, "u1"), CacheEntry::new(2, "u3")]
        );
    }

    #[tokio::test]
    async fn test_rebuild_after_deleting_appended_entry_keeps_others() {
        let store = Arc::new(MockCacheStore::with_entries(vec![
            CacheEntry::new(1, "u1"),
            CacheEntry::new(2, "u2"),
            CacheEntry::new(3, "u3"),
        ]));
        let gate = BuildGate::new();
        let write_lock = CacheWriteLock::new();

        let appender = AppendMediaUseCase::new(
            Arc::new(verifier_accepting_all()),
            store.clone(),
            write_lock.clone(),
        );
        let appended = appender.execute(&media_message(40, &["u4"])).await.unwrap();
        assert_eq!(appended, AppendOutcome::Added(CacheEntry::new(4, "u4")));

        let queries = QueryCacheUseCase::new(store.clone(), write_lock.clone(), gate.clone());
        queries.soft_delete(EntryId(4)).await.unwrap();

        // Newest first, so the deleted "u4" opens the history.
        let source = MockMessageSource::with_pages(vec![vec![
            media_message(40, &["u4"]),
            media_message(30, &["u1"]),
            media_message(20, &["u2"]),
            media_message(10, &["u3"]),
        ]]);
        let builder = BuildCacheUseCase::new(
            Arc::new(source),
            Arc::new(verifier_accepting_all()),
            store.clone(),
            gate,
            write_lock,
        );

        let outcome = builder.execute().await.unwrap();

        assert_eq!(outcome, BuildOutcome::Completed { count: 3 });
        assert_eq!(
            store.load_entries().await.unwrap(),
            vec![
                CacheEntry::new(1, "u1"),
                CacheEntry::new(2, "u2"),
                CacheEntry::new(3, "u3"),
            ]
        );
    }

    /// Serves pages from `inner` and soft-deletes `id` right before page `on_call`.
    struct DeletingSource {
        inner: MockMessageSource,
        queries: QueryCacheUseCase,
        on_call: usize,
        id: EntryId,
    }

    #[async_trait]
    impl MessageSourcePort for DeletingSource {
        async fn fetch_messages(
            &self,
            options: FetchMessagesOptions,
        ) -> Result<Vec<Message>, SourceError> {
            if self.inner.calls().await.len() == self.on_call {
                self.queries.soft_delete(self.id).await.unwrap();
            }
            self.inner.fetch_messages(options).await
        }

        async fn fetch_message(&self, message_id: MessageId) -> Result<Message, SourceError> {
            self.inner.fetch_message(message_id).await
        }
    }

    #[tokio::test]
    async fn test_delete_during_scan_is_honored_by_commit() {
        let store = Arc::new(MockCacheStore::with_entries(vec![
            CacheEntry::new(1, "u1"),
            CacheEntry::new(2, "u2"),
        ]));
        let gate = BuildGate::new();
        let write_lock = CacheWriteLock::new();
        let source = DeletingSource {
            inner: MockMessageSource::with_pages(vec![
                vec![media_message(40, &["u1"])],
                vec![media_message(30, &["u2"])],
            ]),
            queries: QueryCacheUseCase::new(store.clone(), write_lock.clone(), gate.clone()),
            on_call: 1,
            id: EntryId(1),
        };
        let builder = BuildCacheUseCase::new(
            Arc::new(source),
            Arc::new(verifier_accepting_all()),
            store.clone(),
            gate,
            write_lock,
        );

        let outcome = builder.execute().await.unwrap();

        assert_eq!(outcome, BuildOutcome::Completed { count: 1 });
        assert_eq!(store.load_entries().await.unwrap(), vec![CacheEntry::new(1, "u2")]);
        assert!(store.load_url_exclusions().await.unwrap().contains_url("u1"));
        assert!(store.load_id_exclusions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_excluded_urls_are_never_readmitted() {
        let source = MockMessageSource::with_pages(vec![vec![
            media_message(30, &["u1", "banned"]),
            media_message(20, &["banned"]),
        ]]);
        let store = Arc::new(
            MockCacheStore::new()
                .with_exclusions(["banned".to_string()].into_iter().collect(), IdExclusions::new()),
        );

        use_case(source, verifier_accepting_all(), store.clone())
            .execute()
            .await
            .unwrap();

        let entries = store.load_entries().await.unwrap();
        assert_eq!(entries, vec![CacheEntry::new(1, "u1")]);
    }

    #[tokio::test]
    async fn test_concurrent_build_is_rejected_without_writes() {
        let store = Arc::new(MockCacheStore::new());
        let gate = BuildGate::new();
        let builder = BuildCacheUseCase::new(
            Arc::new(MockMessageSource::with_pages(vec![vec![media_message(1, &["u1"])]])),
            Arc::new(MockUrlVerifierPort::new()),
            store.clone(),
            gate.clone(),
            CacheWriteLock::new(),
        );

        let _running = gate.try_begin().unwrap();
        let outcome = builder.execute().await.unwrap();

        assert_eq!(outcome, BuildOutcome::Rejected);
        assert!(store.saves().await.is_empty());
        assert!(!store.has_entries().await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_discards_partial_scan() {
        let source = MockMessageSource::with_pages(vec![
            vec![media_message(40, &["u1"]), media_message(30, &["u2"])],
            vec![media_message(20, &["u3"])],
        ])
        .failing_on_call(1);
        let previous = vec![CacheEntry::new(1, "old")];
        let store = Arc::new(
            MockCacheStore::with_entries(previous.clone())
                .with_exclusions(UrlExclusions::new(), [EntryId(4)].into_iter().collect()),
        );
        let builder = use_case(source, verifier_accepting_all(), store.clone());

        let outcome = builder.execute().await.unwrap();

        assert!(matches!(
            outcome,
            BuildOutcome::Aborted {
                partial: 2,
                retryable: true,
                ..
            }
        ));
        assert_eq!(store.load_entries().await.unwrap(), previous);
        assert_eq!(store.load_id_exclusions().await.unwrap().len(), 1);
        assert!(store.saves().await.is_empty());
        assert!(!builder.is_building());
    }

    #[tokio::test]
    async fn test_missing_channel_aborts_with_zero() {
        let source = MockMessageSource::empty()
            .failing_with(0, SourceError::ChannelNotFound { channel_id: 7 });
        let store = Arc::new(MockCacheStore::new());
        let builder = use_case(source, verifier_accepting_all(), store.clone());

        let outcome = builder.execute().await.unwrap();

        assert_eq!(outcome.count(), 0);
        assert!(!outcome.is_committed());
        assert!(matches!(
            outcome,
            BuildOutcome::Aborted {
                retryable: false,
                ..
            }
        ));
        assert!(!builder.is_building());
    }

    #[tokio::test]
    async fn test_budget_caps_admitted_items() {
        let source = Arc::new(MockMessageSource::with_pages(vec![
            vec![media_message(40, &["u1", "u2"]), media_message(30, &["u3"])],
            vec![media_message(20, &["u4"])],
        ]));
        let store = Arc::new(MockCacheStore::new());
        let builder = BuildCacheUseCase::new(
            source.clone(),
            Arc::new(verifier_accepting_all()),
            store.clone(),
            BuildGate::new(),
            CacheWriteLock::new(),
        )
        .with_settings(BuildSettings {
            page_size: 2,
            max_items: Some(2),
        });

        let outcome = builder.execute().await.unwrap();

        assert_eq!(outcome, BuildOutcome::Completed { count: 2 });
        assert_eq!(source.calls().await.len(), 1);
        assert_eq!(source.calls().await[0].limit, Some(2));
    }

    #[tokio::test]
    async fn test_initialize_skips_existing_cache() {
        let store = Arc::new(MockCacheStore::with_entries(vec![CacheEntry::new(1, "u1")]));
        let builder = use_case(
            MockMessageSource::with_pages(vec![vec![media_message(1, &["u9"])]]),
            MockUrlVerifierPort::new(),
            store.clone(),
        );

        assert_eq!(builder.initialize().await.unwrap(), None);
        assert!(store.saves().await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_builds_when_missing() {
        let store = Arc::new(MockCacheStore::new());
        let builder = use_case(
            MockMessageSource::with_pages(vec![vec![media_message(1, &["u1"])]]),
            verifier_accepting_all(),
            store.clone(),
        );

        let outcome = builder.initialize().await.unwrap();

        assert_eq!(outcome, Some(BuildOutcome::Completed { count: 1 }));
        assert_eq!(
            store.saves().await,
            vec![CollectionKind::Entries, CollectionKind::ExcludedIds]
        );
    }
}
