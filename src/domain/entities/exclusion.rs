use serde::{Deserialize, Serialize};

use super::EntryId;

/// Insertion-ordered set persisted as a plain JSON array.
///
/// Lists are small (one item per moderator deletion), so membership is a
/// linear scan and the on-disk order stays the order of deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet<T> {
    items: Vec<T>,
}

/// URLs that no build or append may ever admit again.
pub type UrlExclusions = ExclusionSet<String>;

/// Sequence numbers to drop on the next full rebuild.
pub type IdExclusions = ExclusionSet<EntryId>;

impl<T> Default for ExclusionSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: PartialEq> ExclusionSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value. Returns `false` if it was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.items.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Returns true if the set holds `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    /// Number of values in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The `count` most recently inserted values, oldest first.
    #[must_use]
    pub fn newest(&self, count: usize) -> &[T] {
        &self.items[self.items.len().saturating_sub(count)..]
    }

    /// Iterates values in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl UrlExclusions {
    /// Returns true if `url` is excluded.
    #[must_use]
    pub fn contains_url(&self, url: &str) -> bool {
        self.items.iter().any(|item| item == url)
    }
}

impl<T: PartialEq> FromIterator<T> for ExclusionSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}
