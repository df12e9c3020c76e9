//! Core pipeline components
//!
//! Leaves first: name matching, the roster index, classification, file
//! organization, show-notes generation, and the orchestrator driving a pass.

pub mod episode_directory;
pub mod episode_organizer;
pub mod file_classifier;
pub mod name_matcher;
pub mod pipeline_orchestrator;
pub mod show_notes;

pub use episode_directory::EpisodeDirectory;
pub use episode_organizer::{EpisodeOrganizer, OrganizeError};
pub use file_classifier::{find_companion_transcript, ClassifiedListing, FileClassifier};
pub use name_matcher::{canonical_base_name, derive_candidate_name, normalize_name};
pub use pipeline_orchestrator::{plan_pass, PipelineOrchestrator, PipelineSettings};
pub use show_notes::{build_prompt, generate_or_sentinel, write_show_notes, GenerationOutcome};
