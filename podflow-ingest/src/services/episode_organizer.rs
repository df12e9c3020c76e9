//! Episode organizer
//!
//! Moves a matched media object (and its transcript, when paired) into the
//! `Ep<n>_<guest>` folder under the output base folder and renames them to
//! their canonical names.

use crate::backends::{StorageBackend, StorageError};
use crate::models::{DroppedObject, EpisodeBundle, FailureStage, FolderHandle};
use std::sync::Arc;
use thiserror::Error;

/// Organizer errors, tagged with the step that failed
#[derive(Debug, Clone, Error)]
pub enum OrganizeError {
    #[error("Moving media failed: {0}")]
    Media(StorageError),

    #[error("Moving transcript failed: {0}")]
    Transcript(StorageError),

    #[error("Reading transcript failed: {0}")]
    TranscriptRead(StorageError),
}

impl OrganizeError {
    pub fn stage(&self) -> FailureStage {
        match self {
            OrganizeError::Media(_) => FailureStage::MediaMove,
            OrganizeError::Transcript(_) => FailureStage::TranscriptMove,
            OrganizeError::TranscriptRead(_) => FailureStage::TranscriptRead,
        }
    }
}

/// Episode organizer
pub struct EpisodeOrganizer {
    storage: Arc<dyn StorageBackend>,
    media_extension: String,
    transcript_suffix: String,
}

impl EpisodeOrganizer {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        media_extension: impl Into<String>,
        transcript_suffix: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            media_extension: media_extension.into().trim_start_matches('.').to_string(),
            transcript_suffix: transcript_suffix.into(),
        }
    }

    pub fn media_file_name(&self, canonical_name: &str) -> String {
        format!("{}.{}", canonical_name, self.media_extension)
    }

    pub fn transcript_file_name(&self, canonical_name: &str) -> String {
        format!("{}{}", canonical_name, self.transcript_suffix)
    }

    /// Existing child folder named `canonical_name`, else a newly created one
    ///
    /// Check-then-create: two concurrent runs may both create the folder.
    pub async fn resolve_target_folder(
        &self,
        base: &FolderHandle,
        canonical_name: &str,
    ) -> Result<FolderHandle, StorageError> {
        if let Some(existing) = self.storage.find_child_folder(base, canonical_name).await? {
            tracing::debug!(folder = %existing.name, "Reusing existing episode folder");
            return Ok(existing);
        }

        let created = self.storage.create_folder(base, canonical_name).await?;
        tracing::info!(folder = %created.name, parent = %base.name, "Created episode folder");
        Ok(created)
    }

    /// Move + rename media and optional transcript, then read the transcript
    ///
    /// Both canonical names must be free in `target_folder`; otherwise the item
    /// fails before anything leaves the drop location.
    pub async fn organize(
        &self,
        media: &DroppedObject,
        transcript: Option<&DroppedObject>,
        target_folder: &FolderHandle,
        canonical_name: &str,
    ) -> Result<EpisodeBundle, OrganizeError> {
        let media_name = self.media_file_name(canonical_name);
        let transcript_name = self.transcript_file_name(canonical_name);

        let existing = self
            .storage
            .list_children(target_folder)
            .await
            .map_err(OrganizeError::Media)?;
        let taken = |name: &str| {
            existing
                .iter()
                .any(|child| child.name == name)
                .then(|| StorageError::AlreadyExists(format!("{}/{}", target_folder.name, name)))
        };
        if let Some(e) = taken(&media_name) {
            return Err(OrganizeError::Media(e));
        }
        if transcript.is_some() {
            if let Some(e) = taken(&transcript_name) {
                return Err(OrganizeError::Transcript(e));
            }
        }

        let media_object = self
            .relocate(media, target_folder, &media_name)
            .await
            .map_err(OrganizeError::Media)?;

        tracing::info!(
            from = %media.name(),
            to = %media_object.name(),
            folder = %target_folder.name,
            "Media organized"
        );

        let (transcript_object, transcript_text) = match transcript {
            Some(transcript) => {
                let moved = self
                    .relocate(transcript, target_folder, &transcript_name)
                    .await
                    .map_err(OrganizeError::Transcript)?;

                let text = self
                    .storage
                    .read_text(&moved.handle)
                    .await
                    .map_err(OrganizeError::TranscriptRead)?;

                tracing::info!(
                    from = %transcript.name(),
                    to = %moved.name(),
                    chars = text.chars().count(),
                    "Transcript organized"
                );

                (Some(moved), Some(text))
            }
            None => (None, None),
        };

        Ok(EpisodeBundle {
            media_object,
            transcript_object,
            canonical_base_name: canonical_name.to_string(),
            target_folder: target_folder.clone(),
            transcript_text,
        })
    }

    async fn relocate(
        &self,
        object: &DroppedObject,
        folder: &FolderHandle,
        new_name: &str,
    ) -> Result<DroppedObject, StorageError> {
        let moved = self.storage.move_object(&object.handle, folder).await?;
        let renamed = self.storage.rename_object(&moved, new_name).await?;

        Ok(DroppedObject {
            handle: renamed,
            kind: object.kind,
            classification: object.classification,
        })
    }
}
