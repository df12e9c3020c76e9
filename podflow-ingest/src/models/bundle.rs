//! Episode bundle: the unit of work for one episode

use super::dropped_object::DroppedObject;
use super::handles::FolderHandle;
use serde::Serialize;

/// Matched media + optional transcript after they were moved into the
/// episode folder. Handles reflect the post-move names.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeBundle {
    pub media_object: DroppedObject,
    pub transcript_object: Option<DroppedObject>,
    pub canonical_base_name: String,
    pub target_folder: FolderHandle,
    /// Transcript content; `None` when no transcript was paired
    #[serde(skip)]
    pub transcript_text: Option<String>,
}

impl EpisodeBundle {
    /// Whether generation should run for this bundle
    pub fn has_transcript_text(&self) -> bool {
        self.transcript_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }
}
