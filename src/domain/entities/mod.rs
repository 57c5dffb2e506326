//! Domain entity definitions.

mod cache_entry;
mod exclusion;
mod message;

pub use cache_entry::{CacheEntry, EntryId};
pub use exclusion::{ExclusionSet, IdExclusions, UrlExclusions};
pub use message::{Attachment, Embed, EmbedImage, Message, MessageAuthor, MessageId};
