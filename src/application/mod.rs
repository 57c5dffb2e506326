//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Stateless helpers shared by the use cases.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{AppendOutcome, BuildOutcome, CacheStatus, EntryLookup};
pub use use_cases::{AppendMediaUseCase, BuildCacheUseCase, BuildSettings, QueryCacheUseCase};
