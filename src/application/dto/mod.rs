//! Data transfer objects for the application layer.

mod cache_dto;

pub use cache_dto::{AppendOutcome, BuildOutcome, CacheStatus, EntryLookup};
