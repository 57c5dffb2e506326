//! Chat command parsing and replies.

use std::fmt;

use tracing::debug;

use crate::application::dto::{BuildOutcome, EntryLookup};
use crate::application::use_cases::{BuildCacheUseCase, QueryCacheUseCase};
use crate::domain::entities::{CacheEntry, EntryId};
use crate::domain::errors::CacheError;
use crate::infrastructure::config::CommandsConfig;

/// Which usage line to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageHint {
    /// Usage of the random/lookup trigger.
    Lookup,
    /// Usage of the delete trigger.
    Delete,
}

/// A recognized chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// Post a random cached item.
    Random,
    /// Post the item with this ID.
    Get(EntryId),
    /// Soft-delete the item with this ID.
    Delete(EntryId),
    /// Run a full rebuild.
    Rebuild,
    /// A numeric argument outside the ID range.
    InvalidId,
    /// Malformed arguments.
    Usage(UsageHint),
}

impl ChatCommand {
    /// Parses a message text against the configured triggers.
    ///
    /// Triggers match case-insensitively on the first whitespace-separated
    /// word. Returns `None` for text that is not a command.
    #[must_use]
    pub fn parse(text: &str, triggers: &CommandsConfig) -> Option<Self> {
        let lowered = text.trim().to_lowercase();
        let mut words = lowered.split_whitespace();
        let head = words.next()?;
        let args: Vec<&str> = words.collect();

        if head == triggers.random.to_lowercase() {
            return Some(match args.as_slice() {
                [] => Self::Random,
                [arg] => Self::with_id(arg, Self::Get, UsageHint::Lookup),
                _ => Self::Usage(UsageHint::Lookup),
            });
        }

        if head == triggers.delete.to_lowercase() {
            return Some(match args.as_slice() {
                [arg] => Self::with_id(arg, Self::Delete, UsageHint::Delete),
                _ => Self::Usage(UsageHint::Delete),
            });
        }

        (head == triggers.rebuild.to_lowercase() && args.is_empty()).then_some(Self::Rebuild)
    }

    /// Reads an ID argument.
    ///
    /// Any finite decimal literal is accepted and its leading integer is the
    /// ID, so `1.5` and `1e3` both ask for 1. A literal without an integer
    /// prefix, such as `.5`, is an invalid ID. Anything else gets the usage line.
    fn with_id(arg: &str, command: fn(EntryId) -> Self, hint: UsageHint) -> Self {
        if !arg.parse::<f64>().is_ok_and(f64::is_finite) {
            return Self::Usage(hint);
        }
        leading_integer(arg)
            .and_then(|n| u32::try_from(n).ok())
            .map_or(Self::InvalidId, |id| command(EntryId(id)))
    }
}

fn leading_integer(arg: &str) -> Option<i64> {
    let signed = arg.starts_with(['+', '-']);
    let digits = arg[usize::from(signed)..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    arg[..usize::from(signed) + digits].parse().ok()
}

/// Text sent back for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Reply {
    Entry(CacheEntry),
    /// The cache has no entries.
    Empty,
    PendingDeletion,
    InvalidId,
    Deleted(EntryId),
    Usage(String),
    BuildInProgress,
    BuildComplete(usize),
    /// Pagination failed and the previous cache was kept.
    BuildAborted {
        partial: usize,
        reason: String,
        retryable: bool,
    },
    /// No message source is configured.
    BuildUnavailable,
}

impl From<BuildOutcome> for Reply {
    fn from(outcome: BuildOutcome) -> Self {
        match outcome {
            BuildOutcome::Completed { count } => Self::BuildComplete(count),
            BuildOutcome::Aborted {
                partial,
                reason,
                retryable,
            } => Self::BuildAborted {
                partial,
                reason,
                retryable,
            },
            BuildOutcome::Rejected => Self::BuildInProgress,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(entry) => write!(f, "ID: {}\n{}", entry.id, entry.url),
            Self::Empty => write!(f, "No media available in the cache."),
            Self::PendingDeletion => write!(
                f,
                "This item has been marked for deletion and is no longer available."
            ),
            Self::InvalidId => write!(f, "Invalid ID. Please provide a valid media ID."),
            Self::Deleted(id) => write!(
                f,
                "Media with ID {id} has been marked for deletion and will not appear in future cache builds."
            ),
            Self::Usage(text) => write!(f, "{text}"),
            Self::BuildInProgress => write!(f, "Cache build is already in progress."),
            Self::BuildComplete(count) => write!(
                f,
                "Cache building complete. Loaded {count} items into the cache."
            ),
            Self::BuildAborted {
                partial,
                reason,
                retryable,
            } => {
                write!(f, "Cache build aborted after {partial} items: {reason}")?;
                if *retryable {
                    write!(f, " Try again later.")?;
                }
                Ok(())
            }
            Self::BuildUnavailable => write!(f, "Cache building is not configured."),
        }
    }
}

/// Routes chat commands to the cache use cases.
pub struct CommandDispatcher {
    triggers: CommandsConfig,
    queries: QueryCacheUseCase,
    builder: Option<BuildCacheUseCase>,
}

impl CommandDispatcher {
    /// Creates a dispatcher that can answer lookups and deletions.
    #[must_use]
    pub const fn new(triggers: CommandsConfig, queries: QueryCacheUseCase) -> Self {
        Self {
            triggers,
            queries,
            builder: None,
        }
    }

    /// Enables the rebuild command.
    #[must_use]
    pub fn with_builder(mut self, builder: BuildCacheUseCase) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Parses and runs `text`. Returns `None` when it is not a command.
    ///
    /// # Errors
    /// Returns storage errors from the use cases.
    pub async fn dispatch(&self, text: &str) -> Result<Option<Reply>, CacheError> {
        let Some(command) = ChatCommand::parse(text, &self.triggers) else {
            return Ok(None);
        };
        debug!(?command, "Dispatching chat command");
        self.execute(command).await.map(Some)
    }

    /// Runs a parsed command.
    ///
    /// # Errors
    /// Returns storage errors from the use cases.
    pub async fn execute(&self, command: ChatCommand) -> Result<Reply, CacheError> {
        match command {
            ChatCommand::Random => Ok(self
                .queries
                .get_random()
                .await?
                .map_or(Reply::Empty, Reply::Entry)),
            ChatCommand::Get(id) => Ok(match self.queries.lookup(id).await? {
                EntryLookup::Found(entry) => Reply::Entry(entry),
                EntryLookup::PendingDeletion => Reply::PendingDeletion,
                EntryLookup::Invalid => Reply::InvalidId,
            }),
            ChatCommand::Delete(id) => match self.queries.soft_delete(id).await {
                Ok(removed) => Ok(Reply::Deleted(removed.id)),
                Err(CacheError::NotFound { .. }) => Ok(Reply::InvalidId),
                Err(e) => Err(e),
            },
            ChatCommand::Rebuild => match &self.builder {
                Some(builder) => builder.execute().await.map(Reply::from),
                None => Ok(Reply::BuildUnavailable),
            },
            ChatCommand::InvalidId => Ok(Reply::InvalidId),
            ChatCommand::Usage(hint) => Ok(Reply::Usage(self.usage(hint))),
        }
    }

    fn usage(&self, hint: UsageHint) -> String {
        match hint {
            UsageHint::Lookup => format!(
                "Invalid command. Use {0} or {0} <ID>.",
                self.triggers.random
            ),
            UsageHint::Delete => format!("Invalid command. Use {} <ID>.", self.triggers.delete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{BuildGate, CacheWriteLock};
    use crate::domain::entities::{Attachment, Message, MessageAuthor};
    use crate::domain::ports::CacheStorePort;
    use crate::domain::ports::mocks::{MockCacheStore, MockMessageSource, MockUrlVerifierPort};
    use chrono::Utc;
    use std::sync::Arc;
    use test_case::test_case;

    #[test_case("!media", Some(ChatCommand::Random) ; "random")]
    #[test_case("  !MEDIA  ", Some(ChatCommand::Random) ; "random_case_and_padding")]
    #[test_case("!media 3", Some(ChatCommand::Get(EntryId(3))) ; "get")]
    #[test_case("!media -1", Some(ChatCommand::InvalidId) ; "get_negative")]
    #[test_case("!media abc", Some(ChatCommand::Usage(UsageHint::Lookup)) ; "get_not_a_number")]
    #[test_case("!media 1.5", Some(ChatCommand::Get(EntryId(1))) ; "get_fraction_truncates")]
    #[test_case("!media 2e3", Some(ChatCommand::Get(EntryId(2))) ; "get_exponent_keeps_leading_digits")]
    #[test_case("!media +3", Some(ChatCommand::Get(EntryId(3))) ; "get_explicit_sign")]
    #[test_case("!media .5", Some(ChatCommand::InvalidId) ; "get_without_integer_part")]
    #[test_case("!media infinity", Some(ChatCommand::Usage(UsageHint::Lookup)) ; "get_infinite")]
    #[test_case("!media nan", Some(ChatCommand::Usage(UsageHint::Lookup)) ; "get_nan")]
    #[test_case("!media 3abc", Some(ChatCommand::Usage(UsageHint::Lookup)) ; "get_trailing_garbage")]
    #[test_case("!media 99999999999", Some(ChatCommand::InvalidId) ; "get_beyond_id_range")]
    #[test_case("!mediadelete 2.9", Some(ChatCommand::Delete(EntryId(2))) ; "delete_fraction_truncates")]
    #[test_case("!media 1 2", Some(ChatCommand::Usage(UsageHint::Lookup)) ; "get_extra_args")]
    #[test_case("!mediadelete 4", Some(ChatCommand::Delete(EntryId(4))) ; "delete")]
    #[test_case("!mediadelete", Some(ChatCommand::Usage(UsageHint::Delete)) ; "delete_without_id")]
    #[test_case("!mediarebuild", Some(ChatCommand::Rebuild) ; "rebuild")]
    #[test_case("!mediarebuild now", None ; "rebuild_with_args")]
    #[test_case("!medias", None ; "prefix_is_not_trigger")]
    #[test_case("hello there", None ; "plain_text")]
    #[test_case("", None ; "empty")]
    fn test_parse(text: &str, expected: Option<ChatCommand>) {
        assert_eq!(ChatCommand::parse(text, &CommandsConfig::default()), expected);
    }

    #[test]
    fn test_parse_custom_triggers() {
        let triggers = CommandsConfig {
            random: "!Art".to_string(),
            delete: "!artdel".to_string(),
            rebuild: "!artbuild".to_string(),
        };

        assert_eq!(ChatCommand::parse("!art", &triggers), Some(ChatCommand::Random));
        assert_eq!(ChatCommand::parse("!media", &triggers), None);
    }

    #[test]
    fn test_reply_rendering() {
        assert_eq!(
            Reply::Entry(CacheEntry::new(2, "https://cdn/a.png")).to_string(),
            "ID: 2\nhttps://cdn/a.png"
        );
        assert_eq!(
            Reply::BuildComplete(5).to_string(),
            "Cache building complete. Loaded 5 items into the cache."
        );
        assert_eq!(
            Reply::BuildAborted {
                partial: 2,
                reason: "channel 7 not found".to_string(),
                retryable: false,
            }
            .to_string(),
            "Cache build aborted after 2 items: channel 7 not found"
        );
        assert_eq!(
            Reply::BuildAborted {
                partial: 0,
                reason: "timeout".to_string(),
                retryable: true,
            }
            .to_string(),
            "Cache build aborted after 0 items: timeout Try again later."
        );
    }

    fn media_message(id: u64, url: &str) -> Message {
        Message::new(id, MessageAuthor::new("1", "poster", false), "", Utc::now())
            .with_attachments(vec![Attachment::new("1", "file.png", url)])
    }

    fn dispatcher(store: Arc<MockCacheStore>, source: MockMessageSource) -> CommandDispatcher {
        let gate = BuildGate::new();
        let write_lock = CacheWriteLock::new();
        let mut verifier = MockUrlVerifierPort::new();
        verifier.expect_verify().returning(|_| true);

        let queries = QueryCacheUseCase::new(store.clone(), write_lock.clone(), gate.clone());
        let builder = BuildCacheUseCase::new(
            Arc::new(source),
            Arc::new(verifier),
            store,
            gate,
            write_lock,
        );
        CommandDispatcher::new(CommandsConfig::default(), queries).with_builder(builder)
    }

    #[tokio::test]
    async fn test_rebuild_then_lookup_and_delete() {
        let store = Arc::new(MockCacheStore::new());
        let source = MockMessageSource::with_pages(vec![vec![
            media_message(2, "https://cdn/b.png"),
            media_message(1, "https://cdn/a.png"),
        ]]);
        let dispatcher = dispatcher(store.clone(), source);

        let built = dispatcher.dispatch("!mediarebuild").await.unwrap();
        assert_eq!(built, Some(Reply::BuildComplete(2)));

        let first = dispatcher.dispatch("!media 1").await.unwrap();
        assert_eq!(first, Some(Reply::Entry(CacheEntry::new(1, "https://cdn/b.png"))));

        let deleted = dispatcher.dispatch("!mediadelete 1").await.unwrap();
        assert_eq!(deleted, Some(Reply::Deleted(EntryId(1))));

        let again = dispatcher.dispatch("!media 1").await.unwrap();
        assert_eq!(again, Some(Reply::PendingDeletion));

        let missing = dispatcher.dispatch("!mediadelete 9").await.unwrap();
        assert_eq!(missing, Some(Reply::InvalidId));

        assert!(store.load_url_exclusions().await.unwrap().contains_url("https://cdn/b.png"));
    }

    #[tokio::test]
    async fn test_random_on_empty_cache() {
        let dispatcher = dispatcher(Arc::new(MockCacheStore::new()), MockMessageSource::empty());

        let reply = dispatcher.dispatch("!media").await.unwrap();

        assert_eq!(reply, Some(Reply::Empty));
        assert_eq!(
            reply.map(|r| r.to_string()).as_deref(),
            Some("No media available in the cache.")
        );
    }

    #[tokio::test]
    async fn test_usage_mentions_trigger() {
        let dispatcher = dispatcher(Arc::new(MockCacheStore::new()), MockMessageSource::empty());

        let reply = dispatcher.dispatch("!mediadelete").await.unwrap().unwrap();

        assert_eq!(reply.to_string(), "Invalid command. Use !mediadelete <ID>.");
    }

    #[tokio::test]
    async fn test_failed_rebuild_reports_abort() {
        let store = Arc::new(MockCacheStore::with_entries(vec![CacheEntry::new(1, "old")]));
        let source = MockMessageSource::with_pages(vec![vec![media_message(1, "https://cdn/a.png")]])
            .failing_on_call(0);
        let dispatcher = dispatcher(store.clone(), source);

        let reply = dispatcher.dispatch("!mediarebuild").await.unwrap();

        assert!(matches!(reply, Some(Reply::BuildAborted { partial: 0, .. })));
        assert_eq!(store.load_entries().await.unwrap(), vec![CacheEntry::new(1, "old")]);
    }

    #[tokio::test]
    async fn test_rebuild_without_source_is_unavailable() {
        let queries = QueryCacheUseCase::new(
            Arc::new(MockCacheStore::new()),
            CacheWriteLock::new(),
            BuildGate::new(),
        );
        let dispatcher = CommandDispatcher::new(CommandsConfig::default(), queries);

        let reply = dispatcher.execute(ChatCommand::Rebuild).await.unwrap();

        assert_eq!(reply, Reply::BuildUnavailable);
    }

    #[tokio::test]
    async fn test_non_command_is_ignored() {
        let dispatcher = dispatcher(Arc::new(MockCacheStore::new()), MockMessageSource::empty());

        assert_eq!(dispatcher.dispatch("nice picture").await.unwrap(), None);
    }
}
