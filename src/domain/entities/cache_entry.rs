use serde::{Deserialize, Serialize};

/// Build-relative sequence number of a cached media item. Always 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u32);

impl EntryId {
    /// First identifier handed out by a build.
    pub const FIRST: Self = Self(1);

    /// Returns the underlying u32 value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the identifier following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Identifier for the item at `index` in a freshly numbered sequence.
    #[must_use]
    pub fn from_position(index: usize) -> Self {
        Self(u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1)))
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntryId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// One admitted media URL and its sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Sequence number.
    pub id: EntryId,
    /// Verified media URL.
    pub url: String,
}

impl CacheEntry {
    /// Creates a new cache entry.
    #[must_use]
    pub fn new(id: impl Into<EntryId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_as_flat_object() {
        let entry = CacheEntry::new(3, "https://cdn.example.com/a.png");
        let json = serde_json::to_string(&entry).unwrap();

        assert_eq!(json, r#"{"id":3,"url":"https://cdn.example.com/a.png"}"#);
    }

    #[test]
    fn test_from_position_is_one_based() {
        assert_eq!(EntryId::from_position(0), EntryId::FIRST);
        assert_eq!(EntryId::from_position(41), EntryId(42));
        assert_eq!(EntryId(7).next(), EntryId(8));
    }
}
