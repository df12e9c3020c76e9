//! Scripted collaborators: roster, text generator, document store

use async_trait::async_trait;
use podflow_ingest::backends::{
    DocumentError, DocumentStore, GenerationError, RosterError, RosterSource, TextGenerator,
};
use podflow_ingest::models::{DocumentHandle, FolderHandle, RosterEntry};
use podflow_ingest::EpisodeDirectory;
use std::sync::Mutex;

/// Roster source returning fixed rows (header row included)
pub struct StaticRosterSource {
    rows: Vec<Vec<String>>,
}

impl StaticRosterSource {
    /// Header row + one row per `(episode, guest)`
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let mut rows = vec![vec!["Episode".to_string(), "Guest".to_string()]];
        rows.extend(
            entries
                .iter()
                .map(|(ep, guest)| vec![ep.to_string(), guest.to_string()]),
        );
        Self { rows }
    }
}

#[async_trait]
impl RosterSource for StaticRosterSource {
    async fn read_all_rows(&self, _sheet_id: &str, _sheet_name: &str) -> Result<Vec<Vec<String>>, RosterError> {
        Ok(self.rows.clone())
    }
}

pub fn directory(entries: &[(&str, &str)]) -> EpisodeDirectory {
    EpisodeDirectory::from_entries(
        entries
            .iter()
            .map(|(ep, guest)| RosterEntry::new(*ep, *guest))
            .collect(),
    )
}

/// Generator returning the same scripted result and recording prompts
pub struct ScriptedGenerator {
    result: Result<String, GenerationError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn ok(text: &str) -> Self {
        Self::with_result(Ok(text.to_string()))
    }

    pub fn failing(error: GenerationError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<String, GenerationError>) -> Self {
        Self {
            result,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.result.clone()
    }
}

/// A document as written through the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDocument {
    pub title: String,
    pub blocks: Vec<Block>,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    Divider,
}

impl RecordedDocument {
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| match b {
                Block::Heading(t) | Block::Paragraph(t) => t.clone(),
                Block::Divider => "---".to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Document store recording every call
#[derive(Default)]
pub struct RecordingDocumentStore {
    documents: Mutex<Vec<RecordedDocument>>,
    fail_create: bool,
}

impl RecordingDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `create_document` always fails
    pub fn failing() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            fail_create: true,
        }
    }

    pub fn documents(&self) -> Vec<RecordedDocument> {
        self.documents.lock().unwrap().clone()
    }

    fn with_document<T>(
        &self,
        handle: &DocumentHandle,
        f: impl FnOnce(&mut RecordedDocument) -> T,
    ) -> Result<T, DocumentError> {
        let mut documents = self.documents.lock().unwrap();
        let index: usize = handle
            .id
            .parse()
            .map_err(|_| DocumentError::NotFound(handle.id.clone()))?;
        documents
            .get_mut(index)
            .map(f)
            .ok_or_else(|| DocumentError::NotFound(handle.id.clone()))
    }
}

#[async_trait]
impl DocumentStore for RecordingDocumentStore {
    async fn create_document(&self, title: &str) -> Result<DocumentHandle, DocumentError> {
        if self.fail_create {
            return Err(DocumentError::io(title, "quota exceeded"));
        }
        let mut documents = self.documents.lock().unwrap();
        documents.push(RecordedDocument {
            title: title.to_string(),
            blocks: Vec::new(),
            folder: None,
        });
        Ok(DocumentHandle {
            id: (documents.len() - 1).to_string(),
            title: title.to_string(),
        })
    }

    async fn append_heading(&self, document: &DocumentHandle, text: &str) -> Result<(), DocumentError> {
        self.with_document(document, |d| d.blocks.push(Block::Heading(text.to_string())))
    }

    async fn append_paragraph(&self, document: &DocumentHandle, text: &str) -> Result<(), DocumentError> {
        self.with_document(document, |d| d.blocks.push(Block::Paragraph(text.to_string())))
    }

    async fn append_divider(&self, document: &DocumentHandle) -> Result<(), DocumentError> {
        self.with_document(document, |d| d.blocks.push(Block::Divider))
    }

    async fn move_to_folder(
        &self,
        document: &DocumentHandle,
        folder: &FolderHandle,
    ) -> Result<DocumentHandle, DocumentError> {
        self.with_document(document, |d| d.folder = Some(folder.id.clone()))?;
        Ok(document.clone())
    }
}
