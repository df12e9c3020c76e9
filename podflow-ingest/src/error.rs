//! Error types for podflow-ingest
//!
//! Per-item failures are recorded in the run summary; `IngestError` is only
//! returned for problems that stop a pass before any item is processed
//! (unreadable drop folder, roster load, collaborator construction).

use crate::backends::{DocumentError, GenerationError, RosterError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Common error: {0}")]
    Common(#[from] podflow_common::Error),
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;
