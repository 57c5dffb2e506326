//! Domain error types.

mod cache_error;
mod source_error;
mod store_error;
mod verify_error;

pub use cache_error::CacheError;
pub use source_error::SourceError;
pub use store_error::StoreError;
pub use verify_error::VerifyError;
