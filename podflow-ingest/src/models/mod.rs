//! Data models for podflow-ingest
//!
//! Roster entries, dropped objects with their classification tag, episode
//! bundles and per-item run outcomes.

pub mod bundle;
pub mod dropped_object;
pub mod handles;
pub mod outcome;
pub mod roster;

pub use bundle::EpisodeBundle;
pub use dropped_object::{Classification, DroppedObject, MimeKind};
pub use handles::{DocumentHandle, FolderHandle, ObjectHandle};
pub use outcome::{FailureStage, ItemOutcome, ItemReport, OutcomeKind, PlannedAction, RunSummary};
pub use roster::{EpisodeNumber, MatchResult, RosterEntry, RosterLayout};
