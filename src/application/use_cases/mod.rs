//! Use case implementations.

mod append_media_use_case;
mod build_cache_use_case;
mod query_cache_use_case;

pub use append_media_use_case::AppendMediaUseCase;
pub use build_cache_use_case::{BuildCacheUseCase, BuildSettings};
pub use query_cache_use_case::QueryCacheUseCase;
