//! Stateless helpers and shared guards used by the use cases.

pub mod build_gate;
pub mod url_extractor;

pub use build_gate::{BuildGate, BuildGuard, CacheWriteLock};
pub use url_extractor::UrlExtractor;
