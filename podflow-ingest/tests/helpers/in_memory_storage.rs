//! In-memory storage backend with an operation log

use async_trait::async_trait;
use podflow_ingest::backends::{StorageBackend, StorageError};
use podflow_ingest::models::{FolderHandle, ObjectHandle};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Mutating operation performed against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    CreateFolder { parent: String, name: String },
    Move { object: String, folder: String },
    Rename { object: String, new_name: String },
}

#[derive(Debug, Clone)]
struct Folder {
    name: String,
    parent: Option<String>,
}

#[derive(Debug, Clone)]
struct Object {
    name: String,
    mime_type: String,
    folder: String,
    content: String,
}

#[derive(Default)]
struct State {
    folders: HashMap<String, Folder>,
    /// Object ids in insertion order
    order: Vec<String>,
    objects: HashMap<String, Object>,
    ops: Vec<StorageOp>,
    next_id: usize,
    failing_moves: HashSet<String>,
}

/// Storage backend keeping folders and objects in memory
///
/// Ids are stable across moves and renames, so tests can follow an object by
/// the id it was dropped with.
pub struct InMemoryStorage {
    state: Mutex<State>,
}

pub const ROOT_ID: &str = "root";
pub const DROP_ID: &str = "drop";

impl InMemoryStorage {
    /// `root/` containing an empty `drop/` folder
    pub fn new() -> Self {
        let mut state = State::default();
        state.folders.insert(
            ROOT_ID.to_string(),
            Folder {
                name: "Podcast".to_string(),
                parent: None,
            },
        );
        state.folders.insert(
            DROP_ID.to_string(),
            Folder {
                name: "Drop".to_string(),
                parent: Some(ROOT_ID.to_string()),
            },
        );
        Self {
            state: Mutex::new(state),
        }
    }

    /// Add an object to the drop folder, returns its id
    pub fn drop_file(&self, name: &str, mime_type: &str, content: &str) -> String {
        self.add_object(DROP_ID, name, mime_type, content)
    }

    pub fn add_object(&self, folder: &str, name: &str, mime_type: &str, content: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("obj-{}", state.next_id);
        state.order.push(id.clone());
        state.objects.insert(
            id.clone(),
            Object {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                folder: folder.to_string(),
                content: content.to_string(),
            },
        );
        id
    }

    /// Make every move of the object named `name` fail
    pub fn fail_moves_of(&self, name: &str) {
        self.state.lock().unwrap().failing_moves.insert(name.to_string());
    }

    pub fn ops(&self) -> Vec<StorageOp> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Id of the child folder `name` under `parent`
    pub fn folder_named(&self, parent: &str, name: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .folders
            .iter()
            .find(|(_, f)| f.name == name && f.parent.as_deref() == Some(parent))
            .map(|(id, _)| id.clone())
    }

    /// Object names currently inside `folder`, in insertion order
    pub fn names_in(&self, folder: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .order
            .iter()
            .filter_map(|id| state.objects.get(id))
            .filter(|o| o.folder == folder)
            .map(|o| o.name.clone())
            .collect()
    }

    fn handle(id: &str, object: &Object) -> ObjectHandle {
        ObjectHandle::new(id, object.name.clone(), object.mime_type.clone())
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    async fn open_folder(&self, id: &str) -> Result<FolderHandle, StorageError> {
        let state = self.state.lock().unwrap();
        state
            .folders
            .get(id)
            .map(|f| FolderHandle::new(id, f.name.clone()))
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn list_children(&self, folder: &FolderHandle) -> Result<Vec<ObjectHandle>, StorageError> {
        let state = self.state.lock().unwrap();
        if !state.folders.contains_key(&folder.id) {
            return Err(StorageError::NotFound(folder.id.clone()));
        }
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.objects.get(id).map(|o| (id, o)))
            .filter(|(_, o)| o.folder == folder.id)
            .map(|(id, o)| Self::handle(id, o))
            .collect())
    }

    async fn parent_of(&self, folder: &FolderHandle) -> Result<FolderHandle, StorageError> {
        let state = self.state.lock().unwrap();
        let parent_id = state
            .folders
            .get(&folder.id)
            .and_then(|f| f.parent.clone())
            .ok_or_else(|| StorageError::NoParent(folder.id.clone()))?;
        let parent = state
            .folders
            .get(&parent_id)
            .ok_or_else(|| StorageError::NotFound(parent_id.clone()))?;
        Ok(FolderHandle::new(parent_id.clone(), parent.name.clone()))
    }

    async fn find_child_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<Option<FolderHandle>, StorageError> {
        Ok(self
            .folder_named(&parent.id, name)
            .map(|id| FolderHandle::new(id, name)))
    }

    async fn create_folder(&self, parent: &FolderHandle, name: &str) -> Result<FolderHandle, StorageError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("folder-{}", state.next_id);
        state.folders.insert(
            id.clone(),
            Folder {
                name: name.to_string(),
                parent: Some(parent.id.clone()),
            },
        );
        state.ops.push(StorageOp::CreateFolder {
            parent: parent.id.clone(),
            name: name.to_string(),
        });
        Ok(FolderHandle::new(id, name))
    }

    async fn move_object(
        &self,
        object: &ObjectHandle,
        destination: &FolderHandle,
    ) -> Result<ObjectHandle, StorageError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_moves.contains(&object.name) {
            return Err(StorageError::io(&object.id, "permission denied"));
        }
        if !state.folders.contains_key(&destination.id) {
            return Err(StorageError::NotFound(destination.id.clone()));
        }
        let stored = state
            .objects
            .get_mut(&object.id)
            .ok_or_else(|| StorageError::NotFound(object.id.clone()))?;
        stored.folder = destination.id.clone();
        let handle = Self::handle(&object.id, stored);
        state.ops.push(StorageOp::Move {
            object: object.id.clone(),
            folder: destination.id.clone(),
        });
        Ok(handle)
    }

    async fn rename_object(&self, object: &ObjectHandle, new_name: &str) -> Result<ObjectHandle, StorageError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .objects
            .get_mut(&object.id)
            .ok_or_else(|| StorageError::NotFound(object.id.clone()))?;
        stored.name = new_name.to_string();
        let handle = Self::handle(&object.id, stored);
        state.ops.push(StorageOp::Rename {
            object: object.id.clone(),
            new_name: new_name.to_string(),
        });
        Ok(handle)
    }

    async fn read_text(&self, object: &ObjectHandle) -> Result<String, StorageError> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&object.id)
            .map(|o| o.content.clone())
            .ok_or_else(|| StorageError::NotFound(object.id.clone()))
    }
}
