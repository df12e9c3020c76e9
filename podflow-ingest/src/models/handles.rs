//! Opaque handles issued by the storage and document backends
//!
//! The `id` is backend-defined (a filesystem path for local backends, an
//! object id for hosted stores). Names are display names.

use serde::{Deserialize, Serialize};

/// A folder in the storage backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderHandle {
    pub id: String,
    pub name: String,
}

/// A file-like object in the storage backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHandle {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// A document created through the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub id: String,
    pub title: String,
}

impl FolderHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl ObjectHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }
}
