//! Memory entry model as seen by the ranking core.
//!
//! Entries are owned by the external store; the core only ever holds read-only
//! copies taken at query start.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::memory::core::entry_type::EntryType;
use crate::memory::core::errors::{MemoryError, MemoryResult};

/// Lowest accepted importance.
pub const MIN_IMPORTANCE: u8 = 1;
/// Highest accepted importance.
pub const MAX_IMPORTANCE: u8 = 10;

/// Stable integer identity of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl EntryId {
    /// Wrap a raw row id.
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw row id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntryId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// A stored memory entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// Entry text.
    pub content: String,
    /// Semantic category.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Importance in `1..=10`.
    pub importance: u8,
    /// Soft-delete flag; inactive entries never reach a snapshot.
    pub active: bool,
}

impl MemoryEntry {
    /// Create an active entry.
    ///
    /// # Errors
    /// Returns an error if the importance is outside `1..=10`.
    pub fn new(
        id: impl Into<EntryId>,
        entry_type: EntryType,
        content: impl Into<String>,
        importance: u8,
    ) -> MemoryResult<Self> {
        let entry = Self {
            id: id.into(),
            content: content.into(),
            entry_type,
            importance,
            active: true,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Mark the entry inactive.
    #[must_use]
    pub const fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Validate entry invariants.
    ///
    /// # Errors
    /// Returns an error if the importance is outside `1..=10`.
    pub fn validate(&self) -> MemoryResult<()> {
        if !(MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&self.importance) {
            return Err(MemoryError::InvalidEntry(format!(
                "entry {} importance {} outside {MIN_IMPORTANCE}..={MAX_IMPORTANCE}",
                self.id, self.importance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_active() {
        let entry = MemoryEntry::new(7, EntryType::Fact, "likes tea", 5).unwrap();
        assert!(entry.active);
        assert_eq!(entry.id, EntryId(7));
        assert!(!entry.deactivated().active);
    }

    #[test]
    fn test_importance_bounds() {
        assert!(MemoryEntry::new(1, EntryType::Fact, "x", 0).is_err());
        assert!(MemoryEntry::new(1, EntryType::Fact, "x", 11).is_err());
        assert!(MemoryEntry::new(1, EntryType::Fact, "x", 1).is_ok());
        assert!(MemoryEntry::new(1, EntryType::Fact, "x", 10).is_ok());
    }

    #[test]
    fn test_entry_serializes_type_field() {
        let entry = MemoryEntry::new(3, EntryType::Task, "ship it", 8).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "task");
        assert_eq!(json["id"], 3);
    }
}
