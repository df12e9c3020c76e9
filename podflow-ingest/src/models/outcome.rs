//! Per-item run outcomes and the run summary

use super::dropped_object::{Classification, DroppedObject};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Stage at which an item failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    FolderResolution,
    MediaMove,
    TranscriptMove,
    TranscriptRead,
    DocumentWrite,
}

/// Terminal state of one dropped object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Name carries the processed prefix
    AlreadyProcessed,
    /// Not primary media (transcripts, stray files); left in place or moved
    /// along with their media
    Ignored,
    /// No roster entry matched; media left in the drop location
    NoMatch { candidate: String },
    /// Media organized, no transcript so generation was skipped
    NoTranscript { folder: String, canonical_name: String },
    /// Media + transcript organized and show notes written
    Done {
        folder: String,
        canonical_name: String,
        document: String,
        generation_succeeded: bool,
    },
    /// Storage or document failure for this item only
    Failed { stage: FailureStage, error: String },
}

/// Coarse outcome category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Skipped,
    Organized,
    OrganizedAndGenerated,
    Failed,
}

impl ItemOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ItemOutcome::AlreadyProcessed | ItemOutcome::Ignored | ItemOutcome::NoMatch { .. } => {
                OutcomeKind::Skipped
            }
            ItemOutcome::NoTranscript { .. } => OutcomeKind::Organized,
            ItemOutcome::Done { .. } => OutcomeKind::OrganizedAndGenerated,
            ItemOutcome::Failed { .. } => OutcomeKind::Failed,
        }
    }

    /// Short label for tables and logs
    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::AlreadyProcessed => "already-processed",
            ItemOutcome::Ignored => "ignored",
            ItemOutcome::NoMatch { .. } => "no-match",
            ItemOutcome::NoTranscript { .. } => "no-transcript",
            ItemOutcome::Done { .. } => "done",
            ItemOutcome::Failed { .. } => "failed",
        }
    }
}

/// Outcome record for one listed object
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    /// Object as it was listed (pre-move name)
    pub input: DroppedObject,
    pub outcome: ItemOutcome,
    pub detail: String,
}

/// Result of one orchestrator run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub reports: Vec<ItemReport>,
}

impl RunSummary {
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.kind() == kind)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(OutcomeKind::Failed) > 0
    }

    /// Report for the object originally listed under `name`
    pub fn report_for(&self, name: &str) -> Option<&ItemReport> {
        self.reports.iter().find(|r| r.input.name() == name)
    }
}

/// Dry-run preview of what a run would do with one object
#[derive(Debug, Clone, Serialize)]
pub struct PlannedAction {
    pub input: String,
    pub classification: Classification,
    /// `Ep<n>_<guest>` when the media matched the roster
    pub canonical_name: Option<String>,
    /// Transcript that would be paired
    pub transcript: Option<String>,
    pub note: String,
}
