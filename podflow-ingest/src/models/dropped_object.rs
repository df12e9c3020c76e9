//! Objects found in the drop location
//!
//! A `DroppedObject` wraps the backend handle together with the result of
//! inspecting it once: its mime kind and its classification tag. Later stages
//! read the tag instead of re-deriving it from the name.

use super::handles::ObjectHandle;
use serde::Serialize;

/// Mime types treated as rich documents (hosted docs, Word)
pub const RICH_DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/vnd.google-apps.document",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "application/rtf",
];

/// Coarse mime category of a dropped object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MimeKind {
    Video,
    PlainText,
    Pdf,
    RichDoc,
    Other,
}

impl MimeKind {
    /// Categorise a mime type. `video_mime_type` is the configured primary
    /// media type; other video types fall into `Other`.
    pub fn from_mime(mime_type: &str, video_mime_type: &str) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();

        if mime == video_mime_type.trim().to_ascii_lowercase() {
            MimeKind::Video
        } else if mime == "text/plain" {
            MimeKind::PlainText
        } else if mime == "application/pdf" {
            MimeKind::Pdf
        } else if RICH_DOCUMENT_MIME_TYPES.contains(&mime.as_str()) {
            MimeKind::RichDoc
        } else {
            MimeKind::Other
        }
    }

    /// Kinds accepted as companion transcripts
    pub fn is_transcript(self) -> bool {
        matches!(self, MimeKind::PlainText | MimeKind::Pdf | MimeKind::RichDoc)
    }
}

/// Classification tag assigned by the file classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Not inspected yet
    Pending,
    /// Name carries the processed marker prefix; never touched again
    AlreadyProcessed,
    /// Configured video type; starts episode processing
    PrimaryMedia,
    /// Text/PDF/document that may be paired with a media object
    TranscriptCandidate,
    /// Anything else
    Ignored,
}

/// An object listed in the drop location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedObject {
    pub handle: ObjectHandle,
    pub kind: MimeKind,
    pub classification: Classification,
}

impl DroppedObject {
    /// Wrap a handle; classification stays `Pending` until inspected
    pub fn new(handle: ObjectHandle, video_mime_type: &str) -> Self {
        let kind = MimeKind::from_mime(&handle.mime_type, video_mime_type);
        Self {
            handle,
            kind,
            classification: Classification::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.handle.id
    }

    pub fn name(&self) -> &str {
        &self.handle.name
    }

    pub fn mime_type(&self) -> &str {
        &self.handle.mime_type
    }

    /// Name with its last extension removed (`Fred.mp4` → `Fred`)
    pub fn raw_name_without_extension(&self) -> &str {
        match self.handle.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.handle.name,
        }
    }
}
