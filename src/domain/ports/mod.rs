mod cache_store_port;
mod message_source_port;
mod url_verifier_port;

pub use cache_store_port::{CacheStorePort, CollectionKind};
pub use message_source_port::{FetchMessagesOptions, MAX_PAGE_SIZE, MessageSourcePort};
pub use url_verifier_port::UrlVerifierPort;
