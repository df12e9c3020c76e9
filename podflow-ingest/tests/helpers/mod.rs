//! Test helper utilities shared by the podflow-ingest integration suites

#![allow(dead_code)]

pub mod fakes;
pub mod in_memory_storage;
pub mod log_capture;

pub use fakes::{directory, Block, RecordingDocumentStore, ScriptedGenerator, StaticRosterSource};
pub use in_memory_storage::{InMemoryStorage, StorageOp, DROP_ID, ROOT_ID};
pub use log_capture::LogCapture;

use podflow_common::config::FileConventions;
use podflow_ingest::PipelineSettings;

/// Settings for a pass over the in-memory drop folder
pub fn settings() -> PipelineSettings {
    PipelineSettings {
        drop_folder_id: DROP_ID.to_string(),
        output_folder_id: None,
        show_name: "Crazy Wisdom".to_string(),
        conventions: FileConventions::default(),
        max_transcript_chars: 30_000,
    }
}
