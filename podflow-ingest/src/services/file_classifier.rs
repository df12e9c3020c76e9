//! File classifier
//!
//! Tags every listed object exactly once. The processed-prefix check runs
//! before the mime check, so an `Ep...` object is never re-admitted whatever
//! its type.

use super::name_matcher::normalize_name;
use crate::models::{Classification, DroppedObject, MimeKind, ObjectHandle};
use podflow_common::config::FileConventions;
use std::collections::HashSet;

/// Tagged drop-location listing, in backend listing order
#[derive(Debug, Clone, Default)]
pub struct ClassifiedListing {
    pub objects: Vec<DroppedObject>,
}

impl ClassifiedListing {
    fn with_tag(&self, tag: Classification) -> impl Iterator<Item = &DroppedObject> {
        self.objects.iter().filter(move |o| o.classification == tag)
    }

    pub fn unprocessed_media(&self) -> impl Iterator<Item = &DroppedObject> {
        self.with_tag(Classification::PrimaryMedia)
    }

    pub fn already_processed(&self) -> impl Iterator<Item = &DroppedObject> {
        self.with_tag(Classification::AlreadyProcessed)
    }

    pub fn transcript_candidates(&self) -> impl Iterator<Item = &DroppedObject> {
        self.with_tag(Classification::TranscriptCandidate)
    }

    pub fn ignored(&self) -> impl Iterator<Item = &DroppedObject> {
        self.with_tag(Classification::Ignored)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Classifies dropped objects by name prefix and mime type
#[derive(Debug, Clone)]
pub struct FileClassifier {
    processed_prefix: String,
    video_mime_type: String,
}

impl FileClassifier {
    pub fn new(conventions: &FileConventions) -> Self {
        Self {
            processed_prefix: conventions.processed_prefix.clone(),
            video_mime_type: conventions.video_mime_type.clone(),
        }
    }

    /// Wrap and tag a single object
    pub fn inspect(&self, handle: ObjectHandle) -> DroppedObject {
        let mut object = DroppedObject::new(handle, &self.video_mime_type);

        object.classification = if object.name().starts_with(&self.processed_prefix) {
            Classification::AlreadyProcessed
        } else if object.kind == MimeKind::Video {
            Classification::PrimaryMedia
        } else if object.kind.is_transcript() {
            Classification::TranscriptCandidate
        } else {
            Classification::Ignored
        };

        tracing::trace!(
            file = %object.name(),
            mime = %object.mime_type(),
            classification = ?object.classification,
            "Classified dropped object"
        );

        object
    }

    pub fn classify(&self, handles: Vec<ObjectHandle>) -> ClassifiedListing {
        let objects: Vec<DroppedObject> = handles.into_iter().map(|h| self.inspect(h)).collect();
        let listing = ClassifiedListing { objects };

        tracing::debug!(
            total = listing.len(),
            media = listing.unprocessed_media().count(),
            transcripts = listing.transcript_candidates().count(),
            processed = listing.already_processed().count(),
            ignored = listing.ignored().count(),
            "Drop location classified"
        );

        listing
    }
}

/// First unclaimed transcript candidate whose name contains the guest-name
/// candidate (case-insensitive), in listing order
pub fn find_companion_transcript<'a>(
    listing: &'a ClassifiedListing,
    guest_name_candidate: &str,
    claimed: &HashSet<String>,
) -> Option<&'a DroppedObject> {
    let needle = normalize_name(guest_name_candidate);
    if needle.is_empty() {
        return None;
    }

    listing
        .transcript_candidates()
        .filter(|o| !claimed.contains(o.id()))
        .find(|o| o.name().to_lowercase().contains(&needle))
}
