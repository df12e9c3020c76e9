//! Episode directory
//!
//! In-memory index of the roster, loaded once per run. Guest lookup is a
//! case-insensitive containment match in both directions, so a file named
//! "Interview with Fred Vogelstein" finds the roster entry "Fred Vogelstein"
//! and a file named "Fred" finds it too. Roster order decides between several
//! qualifying entries; the ambiguity is logged.

use super::name_matcher::normalize_name;
use crate::backends::{RosterError, RosterSource};
use crate::models::{MatchResult, RosterEntry, RosterLayout};
use std::collections::HashMap;

fn cell(row: &[String], index: usize) -> String {
    row.get(index).map(|c| c.trim().to_string()).unwrap_or_default()
}

/// Roster index
#[derive(Debug, Clone, Default)]
pub struct EpisodeDirectory {
    entries: Vec<RosterEntry>,
}

impl EpisodeDirectory {
    pub fn from_entries(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// Build from raw rows, skipping `layout.header_rows`
    ///
    /// Rows shorter than the configured columns keep an empty value for the
    /// missing cell. Duplicate episode numbers are kept and warned about.
    pub fn from_rows(rows: Vec<Vec<String>>, layout: &RosterLayout) -> Self {
        let entries: Vec<RosterEntry> = rows
            .iter()
            .skip(layout.header_rows)
            .map(|row| RosterEntry::new(cell(row, layout.episode_column), cell(row, layout.guest_column)))
            .collect();

        let mut first_seen: HashMap<&str, &str> = HashMap::new();
        for entry in &entries {
            if entry.episode_number.is_empty() {
                continue;
            }
            match first_seen.get(entry.episode_number.as_str()) {
                Some(first_guest) => tracing::warn!(
                    episode = %entry.episode_number,
                    first_guest = %first_guest,
                    duplicate_guest = %entry.guest_name,
                    "Duplicate episode number in roster"
                ),
                None => {
                    first_seen.insert(entry.episode_number.as_str(), &entry.guest_name);
                }
            }
        }

        Self { entries }
    }

    /// Read all rows from `source` and index them
    pub async fn load(
        source: &dyn RosterSource,
        sheet_id: &str,
        sheet_name: &str,
        layout: &RosterLayout,
    ) -> Result<Self, RosterError> {
        let rows = source.read_all_rows(sheet_id, sheet_name).await?;
        let directory = Self::from_rows(rows, layout);

        tracing::info!(sheet = %sheet_name, entries = directory.len(), "Episode directory loaded");

        Ok(directory)
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First roster entry whose normalized guest name contains, or is
    /// contained in, the normalized needle
    ///
    /// Blank needles and blank guest names never match.
    pub fn find_by_normalized_name(&self, needle: &str) -> Option<&RosterEntry> {
        let needle = normalize_name(needle);
        if needle.is_empty() {
            return None;
        }

        let mut matches = self.entries.iter().filter(|entry| {
            let guest = normalize_name(&entry.guest_name);
            !guest.is_empty() && (needle.contains(&guest) || guest.contains(&needle))
        });

        let first = matches.next()?;
        let others: Vec<String> = matches
            .map(|e| format!("{} ({})", e.guest_name, e.episode_number))
            .collect();

        if !others.is_empty() {
            tracing::warn!(
                needle = %needle,
                chosen = %first.guest_name,
                episode = %first.episode_number,
                also_matched = %others.join(", "),
                "Ambiguous roster match, using first entry in roster order"
            );
        }

        Some(first)
    }

    pub fn lookup(&self, needle: &str) -> MatchResult {
        match self.find_by_normalized_name(needle) {
            Some(entry) => MatchResult::hit(entry),
            None => MatchResult::miss(),
        }
    }
}
