//! External collaborators
//!
//! The pipeline only talks to storage, the roster, the text generator and the
//! document store through these traits. Each has one shipped implementation:
//!
//! | Trait            | Implementation                                   |
//! |------------------|--------------------------------------------------|
//! | `StorageBackend` | [`LocalStorage`] (filesystem directories)        |
//! | `RosterSource`   | [`SheetsRosterSource`], [`FileRosterSource`]     |
//! | `TextGenerator`  | [`GeminiClient`]                                 |
//! | `DocumentStore`  | [`LocalDocumentStore`] (Markdown files)          |

pub mod gemini_client;
pub mod local_documents;
pub mod local_storage;
pub mod roster_sources;

pub use gemini_client::GeminiClient;
pub use local_documents::LocalDocumentStore;
pub use local_storage::LocalStorage;
pub use roster_sources::{FileRosterSource, SheetsRosterSource};

use crate::models::{DocumentHandle, FolderHandle, ObjectHandle};
use async_trait::async_trait;
use thiserror::Error;

/// Sentinel written when the service answered without usable content
pub const GENERATION_ERROR_SENTINEL: &str = "Error generating content.";

/// Sentinel written when the request itself failed
pub const REQUEST_FAILED_SENTINEL: &str = "API Request Failed.";

/// Storage backend errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a folder: {0}")]
    NotAFolder(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Folder has no parent: {0}")]
    NoParent(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

impl StorageError {
    pub fn io(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StorageError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Roster source errors
#[derive(Debug, Clone, Error)]
pub enum RosterError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Roster file error {path}: {message}")]
    FileError { path: String, message: String },
}

/// Text generation errors
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Transport failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Non-success HTTP status
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Response carried no candidates (blocked prompt, quota, ...)
    #[error("No candidates in response: {0}")]
    NoCandidates(String),

    /// Response did not match the expected schema
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    /// Worth another attempt: transport errors, throttling and 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::NetworkError(_) => true,
            GenerationError::ApiError { status, .. } => *status == 429 || *status >= 500,
            GenerationError::NoCandidates(_) | GenerationError::MalformedResponse(_) => false,
        }
    }

    /// Operator-visible text written in place of generated content
    ///
    /// A body that cannot be read as a response counts as a failed request.
    pub fn sentinel(&self) -> &'static str {
        match self {
            GenerationError::NetworkError(_) | GenerationError::MalformedResponse(_) => REQUEST_FAILED_SENTINEL,
            GenerationError::ApiError { .. } | GenerationError::NoCandidates(_) => GENERATION_ERROR_SENTINEL,
        }
    }
}

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

impl DocumentError {
    pub fn io(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        DocumentError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Hierarchical object store holding the drop location and episode folders
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Resolve a folder by backend id
    async fn open_folder(&self, id: &str) -> Result<FolderHandle, StorageError>;

    /// Files directly inside `folder`, in backend listing order
    async fn list_children(&self, folder: &FolderHandle) -> Result<Vec<ObjectHandle>, StorageError>;

    async fn parent_of(&self, folder: &FolderHandle) -> Result<FolderHandle, StorageError>;

    async fn find_child_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<Option<FolderHandle>, StorageError>;

    async fn create_folder(&self, parent: &FolderHandle, name: &str) -> Result<FolderHandle, StorageError>;

    /// Move an object into `destination`, keeping its name. Returns the
    /// updated handle.
    async fn move_object(
        &self,
        object: &ObjectHandle,
        destination: &FolderHandle,
    ) -> Result<ObjectHandle, StorageError>;

    /// Rename an object in place. Returns the updated handle.
    async fn rename_object(&self, object: &ObjectHandle, new_name: &str) -> Result<ObjectHandle, StorageError>;

    async fn read_text(&self, object: &ObjectHandle) -> Result<String, StorageError>;
}

/// Tabular roster provider
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// All rows of one sheet, header included, cells rendered as strings
    async fn read_all_rows(&self, sheet_id: &str, sheet_name: &str) -> Result<Vec<Vec<String>>, RosterError>;
}

/// Text-in / text-out generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Append-only document writer
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(&self, title: &str) -> Result<DocumentHandle, DocumentError>;

    async fn append_heading(&self, document: &DocumentHandle, text: &str) -> Result<(), DocumentError>;

    async fn append_paragraph(&self, document: &DocumentHandle, text: &str) -> Result<(), DocumentError>;

    async fn append_divider(&self, document: &DocumentHandle) -> Result<(), DocumentError>;

    /// Move the document into `folder`. Returns the updated handle.
    async fn move_to_folder(
        &self,
        document: &DocumentHandle,
        folder: &FolderHandle,
    ) -> Result<DocumentHandle, DocumentError>;
}
