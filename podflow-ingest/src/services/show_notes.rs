//! Show-notes generation and write-back
//!
//! Builds the single prompt sent to the text generator, converts generation
//! failures into operator-visible sentinel text, and writes the result as a
//! `<canonical>_ShowNotes` document in the episode folder.

use crate::backends::{DocumentError, DocumentStore, TextGenerator};
use crate::models::{DocumentHandle, FolderHandle};

const TRUNCATION_MARKER: &str = "... [truncated for length]";

/// First `max_chars` characters of `transcript`, with a marker when cut
pub fn truncate_transcript(transcript: &str, max_chars: usize) -> String {
    match transcript.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{}", &transcript[..byte_index], TRUNCATION_MARKER),
        None => transcript.to_string(),
    }
}

pub fn build_prompt(show_name: &str, transcript: &str, max_transcript_chars: usize) -> String {
    format!(
        r#"You are an expert podcast producer. Analyze the following transcript for the "{show}" podcast.

Transcript:
{transcript}

Please generate the following outputs:

1. **Hashtags**: Create 5-10 relevant hashtags. Format: #tag1, #tag2.
2. **Clip Candidates**: Find 5-7 engaging clips (15-90s). For each, provide:
   - Timestamp (approximate)
   - Hook (The engaging line)
   - Rationale (Why this clip works)
3. **Show Notes**:
   - YouTube Title (Catchy, SEO-optimized)
   - YouTube Description (Summary + Key Takeaways)
   - Transistor Show Notes (Brief summary for audio feed)
"#,
        show = show_name,
        transcript = truncate_transcript(transcript, max_transcript_chars),
    )
}

/// Text destined for the document, real or sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub content: String,
    pub succeeded: bool,
}

/// Call the generator; on failure return the matching sentinel text
pub async fn generate_or_sentinel(generator: &dyn TextGenerator, prompt: &str) -> GenerationOutcome {
    match generator.generate(prompt).await {
        Ok(content) => GenerationOutcome {
            content,
            succeeded: true,
        },
        Err(err) => {
            tracing::warn!(error = %err, sentinel = err.sentinel(), "Generation failed, writing sentinel");
            GenerationOutcome {
                content: err.sentinel().to_string(),
                succeeded: false,
            }
        }
    }
}

pub fn document_title(canonical_name: &str, document_suffix: &str) -> String {
    format!("{}{}", canonical_name, document_suffix)
}

/// Create the show-notes document and move it into the episode folder
pub async fn write_show_notes(
    store: &dyn DocumentStore,
    folder: &FolderHandle,
    canonical_name: &str,
    document_suffix: &str,
    show_name: &str,
    content: &str,
) -> Result<DocumentHandle, DocumentError> {
    let document = store
        .create_document(&document_title(canonical_name, document_suffix))
        .await?;

    store
        .append_heading(&document, &format!("{} - Episode Automation Output", show_name))
        .await?;
    store
        .append_paragraph(&document, &format!("Generated for: {}", canonical_name))
        .await?;
    store.append_divider(&document).await?;
    store.append_paragraph(&document, content).await?;

    let moved = store.move_to_folder(&document, folder).await?;
    tracing::info!(document = %moved.title, folder = %folder.name, "Show notes written");

    Ok(moved)
}
