//! Markdown document store
//!
//! Documents are created as `<title>.md` in a staging folder, appended to
//! block by block, then moved next to the episode media. Title clashes get a
//! numeric suffix (`title (2).md`) instead of overwriting.

use super::{DocumentError, DocumentStore};
use crate::models::{DocumentHandle, FolderHandle};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writes documents as Markdown files
pub struct LocalDocumentStore {
    staging_folder: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(staging_folder: impl Into<PathBuf>) -> Self {
        Self {
            staging_folder: staging_folder.into(),
        }
    }

    /// Staging folder under the system temp directory
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join("podflow-documents"))
    }

    pub fn staging_folder(&self) -> &Path {
        &self.staging_folder
    }

    async fn append(&self, document: &DocumentHandle, block: &str) -> Result<(), DocumentError> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&document.id)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DocumentError::NotFound(document.id.clone())
                } else {
                    DocumentError::io(&document.id, e)
                }
            })?;

        file.write_all(block.as_bytes())
            .await
            .map_err(|e| DocumentError::io(&document.id, e))?;
        file.flush().await.map_err(|e| DocumentError::io(&document.id, e))
    }
}

/// First `<stem>.md`, `<stem> (2).md`, ... that does not exist in `folder`
async fn unique_markdown_path(folder: &Path, stem: &str) -> Result<PathBuf, DocumentError> {
    let mut attempt = 1;
    loop {
        let file_name = if attempt == 1 {
            format!("{}.md", stem)
        } else {
            format!("{} ({}).md", stem, attempt)
        };
        let candidate = folder.join(file_name);

        let exists = tokio::fs::try_exists(&candidate)
            .await
            .map_err(|e| DocumentError::io(candidate.to_string_lossy(), e))?;
        if !exists {
            return Ok(candidate);
        }
        attempt += 1;
    }
}

/// Render a heading block
pub fn heading_block(text: &str) -> String {
    format!("# {}\n\n", text.trim())
}

/// Render a paragraph block
pub fn paragraph_block(text: &str) -> String {
    format!("{}\n\n", text.trim_end())
}

pub const DIVIDER_BLOCK: &str = "---\n\n";

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn create_document(&self, title: &str) -> Result<DocumentHandle, DocumentError> {
        tokio::fs::create_dir_all(&self.staging_folder)
            .await
            .map_err(|e| DocumentError::io(self.staging_folder.to_string_lossy(), e))?;

        let path = unique_markdown_path(&self.staging_folder, title).await?;
        tokio::fs::File::create(&path)
            .await
            .map_err(|e| DocumentError::io(path.to_string_lossy(), e))?;

        tracing::debug!(document = %path.display(), "Created document");

        Ok(DocumentHandle {
            id: path.to_string_lossy().to_string(),
            title: title.to_string(),
        })
    }

    async fn append_heading(&self, document: &DocumentHandle, text: &str) -> Result<(), DocumentError> {
        self.append(document, &heading_block(text)).await
    }

    async fn append_paragraph(&self, document: &DocumentHandle, text: &str) -> Result<(), DocumentError> {
        self.append(document, &paragraph_block(text)).await
    }

    async fn append_divider(&self, document: &DocumentHandle) -> Result<(), DocumentError> {
        self.append(document, DIVIDER_BLOCK).await
    }

    async fn move_to_folder(
        &self,
        document: &DocumentHandle,
        folder: &FolderHandle,
    ) -> Result<DocumentHandle, DocumentError> {
        let from = PathBuf::from(&document.id);
        let to = unique_markdown_path(Path::new(&folder.id), &document.title).await?;

        if let Err(rename_err) = tokio::fs::rename(&from, &to).await {
            tokio::fs::copy(&from, &to)
                .await
                .map_err(|_| DocumentError::io(&document.id, &rename_err))?;
            tokio::fs::remove_file(&from)
                .await
                .map_err(|e| DocumentError::io(&document.id, e))?;
        }

        tracing::info!(document = %to.display(), "Document moved to episode folder");

        Ok(DocumentHandle {
            id: to.to_string_lossy().to_string(),
            title: document.title.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks() {
        assert_eq!(heading_block(" Title "), "# Title\n\n");
        assert_eq!(paragraph_block("Body\n"), "Body\n\n");
    }

    #[tokio::test]
    async fn test_create_append_and_move() {
        let dir = tempfile::TempDir::new().unwrap();
        let staging = dir.path().join("staging");
        let episode = dir.path().join("Ep002_Fred Vogelstein");
        tokio::fs::create_dir(&episode).await.unwrap();

        let store = LocalDocumentStore::new(&staging);
        let doc = store.create_document("Ep002_Fred Vogelstein_ShowNotes").await.unwrap();
        store.append_heading(&doc, "Heading").await.unwrap();
        store.append_paragraph(&doc, "Paragraph").await.unwrap();
        store.append_divider(&doc).await.unwrap();

        let folder = FolderHandle::new(episode.to_string_lossy(), "Ep002_Fred Vogelstein");
        let moved = store.move_to_folder(&doc, &folder).await.unwrap();

        let expected = episode.join("Ep002_Fred Vogelstein_ShowNotes.md");
        assert_eq!(PathBuf::from(&moved.id), expected);
        assert!(!PathBuf::from(&doc.id).exists());

        let content = tokio::fs::read_to_string(expected).await.unwrap();
        assert_eq!(content, "# Heading\n\nParagraph\n\n---\n\n");
    }

    #[tokio::test]
    async fn test_title_clash_gets_suffix() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalDocumentStore::new(dir.path());

        let first = store.create_document("Notes").await.unwrap();
        let second = store.create_document("Notes").await.unwrap();

        assert!(first.id.ends_with("Notes.md"));
        assert!(second.id.ends_with("Notes (2).md"));
    }

    #[tokio::test]
    async fn test_append_to_missing_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalDocumentStore::new(dir.path());
        let handle = DocumentHandle {
            id: dir.path().join("gone.md").to_string_lossy().to_string(),
            title: "gone".to_string(),
        };

        let result = store.append_paragraph(&handle, "text").await;
        assert!(matches!(result, Err(DocumentError::NotFound(_))));
    }
}
