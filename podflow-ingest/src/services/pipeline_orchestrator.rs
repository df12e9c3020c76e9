//! Pipeline orchestrator
//!
//! One pass over the drop location:
//!
//! 1. Resolve the drop folder and the output base folder (fatal on error)
//! 2. List and classify the drop location
//! 3. For each unprocessed media object, in listing order:
//!    derive the guest candidate, look it up in the roster, pair the first
//!    unclaimed transcript, organize both into `Ep<n>_<guest>`, generate show
//!    notes when a transcript was read, write the document
//! 4. Report one outcome per listed object, in listing order
//!
//! Failures after step 1 are recorded on the item and never abort the batch.

use super::episode_directory::EpisodeDirectory;
use super::episode_organizer::EpisodeOrganizer;
use super::file_classifier::{find_companion_transcript, ClassifiedListing, FileClassifier};
use super::name_matcher::{canonical_base_name, derive_candidate_name};
use super::show_notes::{build_prompt, generate_or_sentinel, write_show_notes};
use crate::backends::{DocumentStore, StorageBackend, TextGenerator};
use crate::error::IngestResult;
use crate::models::{
    Classification, DroppedObject, FailureStage, FolderHandle, ItemOutcome, ItemReport, OutcomeKind, PlannedAction,
    RosterEntry, RunSummary,
};
use chrono::Utc;
use podflow_common::config::FileConventions;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Immutable per-run settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub drop_folder_id: String,
    /// Base for episode folders; `None` means the drop folder's parent
    pub output_folder_id: Option<String>,
    pub show_name: String,
    pub conventions: FileConventions,
    pub max_transcript_chars: usize,
}

/// Media object resolved against the roster, with its paired transcript
struct Pairing<'a> {
    media: &'a DroppedObject,
    candidate: String,
    entry: Option<&'a RosterEntry>,
    transcript: Option<&'a DroppedObject>,
}

impl Pairing<'_> {
    fn canonical_name(&self) -> Option<String> {
        self.entry
            .map(|entry| canonical_base_name(&entry.episode_number, &entry.guest_name))
    }
}

/// Match every unprocessed media object and claim transcripts, in listing order
fn pair_media<'a>(
    listing: &'a ClassifiedListing,
    directory: &'a EpisodeDirectory,
    media_extension: &str,
) -> Vec<Pairing<'a>> {
    let mut claimed: HashSet<String> = HashSet::new();
    let mut pairings = Vec::new();

    for media in listing.unprocessed_media() {
        let candidate = derive_candidate_name(media.name(), media_extension);
        let entry = directory.find_by_normalized_name(&candidate);

        let transcript = match entry {
            Some(_) => find_companion_transcript(listing, &candidate, &claimed),
            None => None,
        };
        if let Some(transcript) = transcript {
            claimed.insert(transcript.id().to_string());
        }

        pairings.push(Pairing {
            media,
            candidate,
            entry,
            transcript,
        });
    }

    pairings
}

/// Transcript id → name of the media object it was paired with
fn transcript_owners(pairings: &[Pairing<'_>]) -> HashMap<String, String> {
    pairings
        .iter()
        .filter_map(|p| p.transcript.map(|t| (t.id().to_string(), p.media.name().to_string())))
        .collect()
}

fn passive_outcome(object: &DroppedObject, owners: &HashMap<String, String>) -> (ItemOutcome, String) {
    match object.classification {
        Classification::AlreadyProcessed => (
            ItemOutcome::AlreadyProcessed,
            "name carries the processed prefix".to_string(),
        ),
        Classification::TranscriptCandidate => match owners.get(object.id()) {
            Some(media) => (ItemOutcome::Ignored, format!("paired with {}", media)),
            None => (
                ItemOutcome::Ignored,
                "no matching media in this pass".to_string(),
            ),
        },
        Classification::PrimaryMedia | Classification::Ignored | Classification::Pending => (
            ItemOutcome::Ignored,
            format!("unsupported type {}", object.mime_type()),
        ),
    }
}

/// Pipeline orchestrator
pub struct PipelineOrchestrator {
    settings: PipelineSettings,
    directory: EpisodeDirectory,
    classifier: FileClassifier,
    organizer: EpisodeOrganizer,
    storage: Arc<dyn StorageBackend>,
    generator: Arc<dyn TextGenerator>,
    documents: Arc<dyn DocumentStore>,
}

impl PipelineOrchestrator {
    pub fn new(
        settings: PipelineSettings,
        directory: EpisodeDirectory,
        storage: Arc<dyn StorageBackend>,
        generator: Arc<dyn TextGenerator>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        let classifier = FileClassifier::new(&settings.conventions);
        let organizer = EpisodeOrganizer::new(
            Arc::clone(&storage),
            settings.conventions.media_extension.clone(),
            settings.conventions.transcript_suffix.clone(),
        );

        Self {
            settings,
            directory,
            classifier,
            organizer,
            storage,
            generator,
            documents,
        }
    }

    /// Dry run: classify and match without touching storage or the generator
    pub async fn plan(&self) -> IngestResult<Vec<PlannedAction>> {
        plan_pass(&self.settings, &self.directory, self.storage.as_ref()).await
    }

    /// Process the drop location once
    pub async fn run(&self) -> IngestResult<RunSummary> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", run_id = %run_id);
        self.run_pass(run_id).instrument(span).await
    }

    async fn run_pass(&self, run_id: Uuid) -> IngestResult<RunSummary> {
        let started_at = Utc::now();

        let drop_folder = self.storage.open_folder(&self.settings.drop_folder_id).await?;
        let base_folder = match &self.settings.output_folder_id {
            Some(id) => self.storage.open_folder(id).await?,
            None => self.storage.parent_of(&drop_folder).await?,
        };

        tracing::info!(
            drop_folder = %drop_folder.id,
            output_folder = %base_folder.id,
            roster_entries = self.directory.len(),
            "Starting pass"
        );

        let listing = self.classifier.classify(self.storage.list_children(&drop_folder).await?);
        let pairings = pair_media(&listing, &self.directory, &self.settings.conventions.media_extension);
        let owners = transcript_owners(&pairings);

        let mut media_outcomes: HashMap<String, (ItemOutcome, String)> = HashMap::new();
        for pairing in &pairings {
            let result = self.process_media(pairing, &base_folder).await;
            media_outcomes.insert(pairing.media.id().to_string(), result);
        }

        let reports: Vec<ItemReport> = listing
            .objects
            .iter()
            .map(|object| {
                let (outcome, detail) = match media_outcomes.remove(object.id()) {
                    Some(result) => result,
                    None => passive_outcome(object, &owners),
                };
                ItemReport {
                    input: object.clone(),
                    outcome,
                    detail,
                }
            })
            .collect();

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            reports,
        };

        tracing::info!(
            objects = summary.reports.len(),
            generated = summary.count(OutcomeKind::OrganizedAndGenerated),
            organized = summary.count(OutcomeKind::Organized),
            skipped = summary.count(OutcomeKind::Skipped),
            failed = summary.count(OutcomeKind::Failed),
            "Pass complete"
        );

        Ok(summary)
    }

    async fn process_media(&self, pairing: &Pairing<'_>, base_folder: &FolderHandle) -> (ItemOutcome, String) {
        let media = pairing.media;

        let canonical_name = match pairing.canonical_name() {
            Some(name) => name,
            None => {
                tracing::warn!(file = %media.name(), candidate = %pairing.candidate, "No roster entry matches, leaving media in place");
                return (
                    ItemOutcome::NoMatch {
                        candidate: pairing.candidate.clone(),
                    },
                    "no roster entry matches".to_string(),
                );
            }
        };

        let folder = match self.organizer.resolve_target_folder(base_folder, &canonical_name).await {
            Ok(folder) => folder,
            Err(e) => return failed(media, FailureStage::FolderResolution, e),
        };

        let bundle = match self
            .organizer
            .organize(media, pairing.transcript, &folder, &canonical_name)
            .await
        {
            Ok(bundle) => bundle,
            Err(e) => return failed(media, e.stage(), e),
        };

        let transcript_text = match bundle.transcript_text.as_deref() {
            Some(text) if bundle.has_transcript_text() => text,
            other => {
                let detail = if other.is_some() {
                    "transcript is empty, generation skipped"
                } else {
                    "no companion transcript, generation skipped"
                };
                tracing::info!(file = %media.name(), canonical = %canonical_name, "{}", detail);
                return (
                    ItemOutcome::NoTranscript {
                        folder: folder.name.clone(),
                        canonical_name,
                    },
                    detail.to_string(),
                );
            }
        };

        let prompt = build_prompt(
            &self.settings.show_name,
            transcript_text,
            self.settings.max_transcript_chars,
        );
        let generated = generate_or_sentinel(self.generator.as_ref(), &prompt).await;

        let document = match write_show_notes(
            self.documents.as_ref(),
            &folder,
            &canonical_name,
            &self.settings.conventions.document_suffix,
            &self.settings.show_name,
            &generated.content,
        )
        .await
        {
            Ok(document) => document,
            Err(e) => return failed(media, FailureStage::DocumentWrite, e),
        };

        let detail = if generated.succeeded {
            format!("show notes written to {}", document.title)
        } else {
            format!("generation failed, sentinel written to {}", document.title)
        };

        tracing::info!(
            file = %media.name(),
            canonical = %canonical_name,
            document = %document.title,
            generation_succeeded = generated.succeeded,
            "Episode processed"
        );

        (
            ItemOutcome::Done {
                folder: folder.name,
                canonical_name,
                document: document.title,
                generation_succeeded: generated.succeeded,
            },
            detail,
        )
    }
}

fn failed(media: &DroppedObject, stage: FailureStage, error: impl std::fmt::Display) -> (ItemOutcome, String) {
    let error = error.to_string();
    tracing::error!(file = %media.name(), stage = ?stage, error = %error, "Item failed, continuing with next");
    (
        ItemOutcome::Failed {
            stage,
            error: error.clone(),
        },
        error,
    )
}

/// Classification and roster matching only; performs reads, never mutations
pub async fn plan_pass(
    settings: &PipelineSettings,
    directory: &EpisodeDirectory,
    storage: &dyn StorageBackend,
) -> IngestResult<Vec<PlannedAction>> {
    let classifier = FileClassifier::new(&settings.conventions);
    let drop_folder = storage.open_folder(&settings.drop_folder_id).await?;
    let listing = classifier.classify(storage.list_children(&drop_folder).await?);
    let pairings = pair_media(&listing, directory, &settings.conventions.media_extension);
    let owners = transcript_owners(&pairings);

    let by_media: HashMap<&str, &Pairing<'_>> = pairings.iter().map(|p| (p.media.id(), p)).collect();

    let actions = listing
        .objects
        .iter()
        .map(|object| match by_media.get(object.id()) {
            Some(pairing) => {
                let canonical_name = pairing.canonical_name();
                let note = match (&canonical_name, pairing.transcript) {
                    (None, _) => format!("no roster entry matches \"{}\"", pairing.candidate),
                    (Some(name), Some(_)) => format!("organize into {} and generate show notes", name),
                    (Some(name), None) => format!("organize into {}, no transcript", name),
                };
                PlannedAction {
                    input: object.name().to_string(),
                    classification: object.classification,
                    canonical_name,
                    transcript: pairing.transcript.map(|t| t.name().to_string()),
                    note,
                }
            }
            None => PlannedAction {
                input: object.name().to_string(),
                classification: object.classification,
                canonical_name: None,
                transcript: None,
                note: passive_outcome(object, &owners).1,
            },
        })
        .collect();

    Ok(actions)
}
