//! Roster entries and lookup results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Episode identifier exactly as displayed in the roster (`002`, `62`, `S2E4`)
///
/// Leading zeros are significant: they end up in folder and file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeNumber(String);

impl EpisodeNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EpisodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One roster row: an episode and its guest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub episode_number: EpisodeNumber,
    /// Guest name in display form (used verbatim in canonical names)
    pub guest_name: String,
}

impl RosterEntry {
    pub fn new(episode_number: impl Into<String>, guest_name: impl Into<String>) -> Self {
        Self {
            episode_number: EpisodeNumber::new(episode_number),
            guest_name: guest_name.into(),
        }
    }
}

/// Column layout of roster rows (0-based column indices)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterLayout {
    pub episode_column: usize,
    pub guest_column: usize,
    pub header_rows: usize,
}

impl RosterLayout {
    /// Build from spreadsheet-style 1-based column numbers (column A = 1).
    /// A zero column is clamped to the first column.
    pub fn from_one_based(episode_column: usize, guest_column: usize, header_rows: usize) -> Self {
        Self {
            episode_column: episode_column.saturating_sub(1),
            guest_column: guest_column.saturating_sub(1),
            header_rows,
        }
    }
}

impl Default for RosterLayout {
    fn default() -> Self {
        Self::from_one_based(1, 2, 1)
    }
}

/// Result of resolving a candidate guest name against the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: bool,
    pub episode_number: Option<EpisodeNumber>,
    pub full_guest_name: Option<String>,
}

impl MatchResult {
    pub fn hit(entry: &RosterEntry) -> Self {
        Self {
            matched: true,
            episode_number: Some(entry.episode_number.clone()),
            full_guest_name: Some(entry.guest_name.clone()),
        }
    }

    pub fn miss() -> Self {
        Self {
            matched: false,
            episode_number: None,
            full_guest_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_number_keeps_leading_zeros() {
        let number = EpisodeNumber::new(" 002 ");
        assert_eq!(number.as_str(), "002");
        assert_eq!(number.to_string(), "002");
    }

    #[test]
    fn test_layout_from_one_based() {
        let layout = RosterLayout::from_one_based(1, 3, 2);
        assert_eq!(layout.episode_column, 0);
        assert_eq!(layout.guest_column, 2);
        assert_eq!(layout.header_rows, 2);
    }

    #[test]
    fn test_match_result_constructors() {
        let entry = RosterEntry::new("002", "Fred Vogelstein");
        let hit = MatchResult::hit(&entry);
        assert!(hit.matched);
        assert_eq!(hit.full_guest_name.as_deref(), Some("Fred Vogelstein"));

        let miss = MatchResult::miss();
        assert!(!miss.matched);
        assert!(miss.episode_number.is_none());
    }
}
