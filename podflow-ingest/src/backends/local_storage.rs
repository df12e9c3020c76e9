//! Local filesystem storage backend
//!
//! Folders are directories and objects are regular files; handle ids are
//! absolute-or-relative paths as given. Listings are flat (no recursion),
//! sorted by file name so runs are deterministic, and skip system files and
//! dotfiles (partial uploads are usually hidden temp files).
//!
//! Mime types are sniffed from magic bytes with `infer`, falling back to the
//! file extension for formats without a signature (plain text).

use super::{StorageBackend, StorageError};
use crate::models::{FolderHandle, ObjectHandle};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Bytes read for magic-number sniffing
const SNIFF_LEN: usize = 8192;

/// Filesystem-backed storage
pub struct LocalStorage {
    ignore_patterns: Vec<String>,
}

impl LocalStorage {
    /// Create backend with default ignore patterns
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                "desktop.ini".to_string(),
            ],
        }
    }

    fn should_list(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') {
            return false;
        }
        !self.ignore_patterns.iter().any(|p| p == file_name)
    }

    fn folder_handle(path: &Path) -> FolderHandle {
        FolderHandle::new(path.to_string_lossy(), file_name_of(path))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Extension fallback for files `infer` cannot identify
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "rtf" => "application/rtf",
        "gdoc" => "application/vnd.google-apps.document",
        "md" => "text/markdown",
        "srt" => "application/x-subrip",
        "vtt" => "text/vtt",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}

/// Detect mime type from magic bytes, then extension
pub async fn detect_mime(path: &Path) -> Result<String, StorageError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| StorageError::io(path.to_string_lossy(), e))?;

    let mut buffer = vec![0u8; SNIFF_LEN];
    let mut filled = 0;
    loop {
        let read = file
            .read(&mut buffer[filled..])
            .await
            .map_err(|e| StorageError::io(path.to_string_lossy(), e))?;
        if read == 0 {
            break;
        }
        filled += read;
        if filled == buffer.len() {
            break;
        }
    }
    buffer.truncate(filled);

    if let Some(kind) = infer::get(&buffer) {
        // infer reports zip for docx written by some tools; the extension is more specific
        if kind.mime_type() != "application/zip" {
            return Ok(kind.mime_type().to_string());
        }
    }

    Ok(mime_from_extension(path).to_string())
}

/// Move a file, falling back to copy + remove across filesystems
async fn relocate(from: &Path, to: &Path) -> Result<(), StorageError> {
    if tokio::fs::try_exists(to)
        .await
        .map_err(|e| StorageError::io(to.to_string_lossy(), e))?
    {
        return Err(StorageError::AlreadyExists(to.to_string_lossy().to_string()));
    }

    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                error = %rename_err,
                "Rename failed, falling back to copy"
            );
            tokio::fs::copy(from, to)
                .await
                .map_err(|_| StorageError::io(from.to_string_lossy(), &rename_err))?;
            tokio::fs::remove_file(from)
                .await
                .map_err(|e| StorageError::io(from.to_string_lossy(), e))
        }
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn open_folder(&self, id: &str) -> Result<FolderHandle, StorageError> {
        let path = PathBuf::from(id);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| StorageError::NotFound(id.to_string()))?;

        if !metadata.is_dir() {
            return Err(StorageError::NotAFolder(id.to_string()));
        }

        Ok(Self::folder_handle(&path))
    }

    async fn list_children(&self, folder: &FolderHandle) -> Result<Vec<ObjectHandle>, StorageError> {
        let folder_path = PathBuf::from(&folder.id);
        let mut entries = tokio::fs::read_dir(&folder_path)
            .await
            .map_err(|e| StorageError::io(&folder.id, e))?;

        let mut objects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&folder.id, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.should_list(&name) {
                continue;
            }

            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Cannot read file type, skipping");
                    continue;
                }
            };
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            let mime_type = match detect_mime(&path).await {
                Ok(mime) => mime,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Cannot sniff file, skipping");
                    continue;
                }
            };

            objects.push(ObjectHandle::new(path.to_string_lossy(), name, mime_type));
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(folder = %folder.id, objects = objects.len(), "Listed folder");

        Ok(objects)
    }

    async fn parent_of(&self, folder: &FolderHandle) -> Result<FolderHandle, StorageError> {
        let path = PathBuf::from(&folder.id);
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| StorageError::NoParent(folder.id.clone()))?;

        Ok(Self::folder_handle(parent))
    }

    async fn find_child_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<Option<FolderHandle>, StorageError> {
        let path = PathBuf::from(&parent.id).join(name);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => Ok(Some(Self::folder_handle(&path))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path.to_string_lossy(), e)),
        }
    }

    async fn create_folder(&self, parent: &FolderHandle, name: &str) -> Result<FolderHandle, StorageError> {
        let path = PathBuf::from(&parent.id).join(name);
        tokio::fs::create_dir(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                StorageError::AlreadyExists(path.to_string_lossy().to_string())
            } else {
                StorageError::io(path.to_string_lossy(), e)
            }
        })?;

        tracing::info!(folder = %path.display(), "Created folder");

        Ok(Self::folder_handle(&path))
    }

    async fn move_object(
        &self,
        object: &ObjectHandle,
        destination: &FolderHandle,
    ) -> Result<ObjectHandle, StorageError> {
        let from = PathBuf::from(&object.id);
        let to = PathBuf::from(&destination.id).join(&object.name);

        if from == to {
            return Ok(object.clone());
        }

        relocate(&from, &to).await?;

        Ok(ObjectHandle::new(
            to.to_string_lossy(),
            object.name.clone(),
            object.mime_type.clone(),
        ))
    }

    async fn rename_object(&self, object: &ObjectHandle, new_name: &str) -> Result<ObjectHandle, StorageError> {
        let from = PathBuf::from(&object.id);
        let to = from.with_file_name(new_name);

        if from == to {
            return Ok(object.clone());
        }

        relocate(&from, &to).await?;

        Ok(ObjectHandle::new(
            to.to_string_lossy(),
            new_name,
            object.mime_type.clone(),
        ))
    }

    async fn read_text(&self, object: &ObjectHandle) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(&object.id)
            .await
            .map_err(|e| StorageError::io(&object.id, e))?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(
                    file = %object.name,
                    "Transcript is not valid UTF-8, decoding lossily"
                );
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }
}
