//! Memory entry types.
//!
//! The type is the semantic **category** of a stored entry. The ranking core only
//! uses it as a filter: a search may be restricted to a single type, in which case
//! both the lexical corpus and the vector set are narrowed before scoring.
//!
//! Identifiers are stable lowercase strings, matching the `type` column of the
//! entry store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The semantic category of a memory entry.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// A stable fact about the user, agent, or project.
    Fact,
    /// A preference (likes, defaults, choices).
    Preference,
    /// Something that happened.
    Event,
    /// An abstracted insight synthesized from events.
    Insight,
    /// An actionable item.
    Task,
    /// A relationship between people, projects, or tools.
    Relationship,
}

/// Parse error for [`EntryType`].
#[derive(Debug, Clone)]
pub struct EntryTypeParseError {
    value: String,
}

impl EntryTypeParseError {
    /// The raw value that failed parsing.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for EntryTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid entry type: {} (expected one of {})",
            self.value,
            EntryType::ALL
                .iter()
                .map(|t| EntryType::as_str(*t))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for EntryTypeParseError {}

impl EntryType {
    /// All known types, in storage order.
    pub const ALL: &'static [Self] = &[
        Self::Fact,
        Self::Preference,
        Self::Event,
        Self::Insight,
        Self::Task,
        Self::Relationship,
    ];

    /// Stable storage identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fact => "fact",
            Self::Preference => "preference",
            Self::Event => "event",
            Self::Insight => "insight",
            Self::Task => "task",
            Self::Relationship => "relationship",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = EntryTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let normalized = raw.to_ascii_lowercase();

        // Short aliases are accepted on input only; storage always uses `as_str`.
        let entry_type = match normalized.as_str() {
            "fact" => Self::Fact,
            "preference" | "pref" => Self::Preference,
            "event" | "observation" => Self::Event,
            "insight" | "reflection" => Self::Insight,
            "task" | "todo" => Self::Task,
            "relationship" | "relation" => Self::Relationship,
            _ => {
                return Err(EntryTypeParseError {
                    value: raw.to_string(),
                });
            }
        };

        Ok(entry_type)
    }
}
