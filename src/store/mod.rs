//! Object Store
//!
//! Read access to the content-addressed object graph (`ObjectStore`), write
//! access for importers (`ObjectWriter`), and two backends: an in-memory map
//! and a sled database. Both backends share the resolution semantics below
//! through the `ObjectBackend` primitives.

pub mod hasher;
pub mod import;
pub mod memory;
pub mod persistence;

pub use import::{ImportConfig, TreeImporter};
pub use memory::MemoryStore;
pub use persistence::SledObjectStore;

use crate::error::StoreError;
use crate::types::{Commit, ObjectId, ObjectInfo, ObjectKind, TreeEntry};
use serde::{Deserialize, Serialize};

/// Read interface used by the view layer
pub trait ObjectStore {
    /// Resolve a ref name or full hex id to the root tree it points at.
    fn resolve_revision(&self, name: &str) -> Result<ObjectId, StoreError>;

    /// Entries of a tree, in store order.
    fn lookup_tree(&self, id: &ObjectId) -> Result<Vec<TreeEntry>, StoreError>;

    /// Kind and size without loading content.
    fn object_info(&self, id: &ObjectId) -> Result<ObjectInfo, StoreError>;

    /// Full blob content.
    fn read_blob(&self, id: &ObjectId) -> Result<Vec<u8>, StoreError>;

    /// Resolve a ref name or full hex id to a commit id.
    fn resolve_commit(&self, name: &str) -> Result<ObjectId, StoreError>;

    fn read_commit(&self, id: &ObjectId) -> Result<Commit, StoreError>;
}

/// A stored object with its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredObject {
    Blob(Vec<u8>),
    Tree(Vec<TreeEntry>),
    Commit(Commit),
}

impl StoredObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            StoredObject::Blob(_) => ObjectKind::Blob,
            StoredObject::Tree(_) => ObjectKind::Tree,
            StoredObject::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Content id of this object
    pub fn id(&self) -> ObjectId {
        match self {
            StoredObject::Blob(content) => hasher::compute_blob_id(content),
            StoredObject::Tree(entries) => hasher::compute_tree_id(entries),
            StoredObject::Commit(commit) => hasher::compute_commit_id(commit),
        }
    }

    /// Kind plus the size of the canonical payload
    pub fn info(&self) -> ObjectInfo {
        let size = match self {
            StoredObject::Blob(content) => content.len(),
            StoredObject::Tree(entries) => hasher::encode_tree(entries).len(),
            StoredObject::Commit(commit) => hasher::encode_commit(commit).len(),
        };
        ObjectInfo {
            kind: self.kind(),
            size: size as u64,
        }
    }
}

/// Write interface used by importers
pub trait ObjectWriter {
    /// Store an object and return its id. Writing an existing object is a no-op.
    fn write_object(&self, object: StoredObject) -> Result<ObjectId, StoreError>;

    /// Point `name` at `target`, replacing any previous value.
    fn update_ref(&self, name: &str, target: ObjectId) -> Result<(), StoreError>;

    fn write_blob(&self, content: &[u8]) -> Result<ObjectId, StoreError> {
        self.write_object(StoredObject::Blob(content.to_vec()))
    }

    /// Store a tree. Entries are sorted into store order; names must be
    /// non-empty, unique and free of `/`.
    fn write_tree(&self, mut entries: Vec<TreeEntry>) -> Result<ObjectId, StoreError> {
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        for (idx, entry) in entries.iter().enumerate() {
            let name = entry.name.as_str();
            if name.is_empty() || name.contains('/') || name == "." || name == ".." {
                return Err(StoreError::Corrupt(format!(
                    "invalid tree entry name {:?}",
                    entry.name
                )));
            }
            if idx > 0 && entries[idx - 1].name == entry.name {
                return Err(StoreError::Corrupt(format!(
                    "duplicate tree entry name {:?}",
                    entry.name
                )));
            }
        }
        self.write_object(StoredObject::Tree(entries))
    }

    fn write_commit(
        &self,
        tree: ObjectId,
        parents: Vec<ObjectId>,
        message: &str,
    ) -> Result<ObjectId, StoreError> {
        self.write_object(StoredObject::Commit(Commit {
            tree,
            parents,
            message: message.to_string(),
        }))
    }
}

/// Keyed primitives a backend provides; the `ObjectStore` semantics are
/// implemented once on top of these.
pub trait ObjectBackend {
    fn get_ref(&self, name: &str) -> Result<Option<ObjectId>, StoreError>;
    fn get_object(&self, id: &ObjectId) -> Result<Option<StoredObject>, StoreError>;
    fn get_info(&self, id: &ObjectId) -> Result<Option<ObjectInfo>, StoreError>;
    fn list_refs(&self) -> Result<Vec<(String, ObjectId)>, StoreError>;
}

/// A ref name, or failing that a full hex id.
fn lookup_name<B: ObjectBackend + ?Sized>(backend: &B, name: &str) -> Result<ObjectId, StoreError> {
    match backend.get_ref(name)? {
        Some(id) => Ok(id),
        None => ObjectId::from_hex(name).ok_or_else(|| StoreError::InvalidRevision(name.to_string())),
    }
}

pub(crate) fn resolve_revision<B: ObjectBackend + ?Sized>(
    backend: &B,
    name: &str,
) -> Result<ObjectId, StoreError> {
    let id = lookup_name(backend, name)?;

    match backend.get_object(&id)? {
        Some(StoredObject::Tree(_)) => Ok(id),
        Some(StoredObject::Commit(commit)) => match backend.get_info(&commit.tree)? {
            Some(info) if info.kind == ObjectKind::Tree => Ok(commit.tree),
            _ => Err(StoreError::InvalidCommit(name.to_string())),
        },
        Some(StoredObject::Blob(_)) | None => Err(StoreError::InvalidCommit(name.to_string())),
    }
}

pub(crate) fn resolve_commit<B: ObjectBackend + ?Sized>(
    backend: &B,
    name: &str,
) -> Result<ObjectId, StoreError> {
    let id = lookup_name(backend, name)?;
    match backend.get_info(&id)? {
        Some(info) if info.kind == ObjectKind::Commit => Ok(id),
        _ => Err(StoreError::InvalidCommit(name.to_string())),
    }
}

pub(crate) fn read_commit<B: ObjectBackend + ?Sized>(
    backend: &B,
    id: &ObjectId,
) -> Result<Commit, StoreError> {
    match backend.get_object(id)? {
        Some(StoredObject::Commit(commit)) => Ok(commit),
        Some(other) => Err(StoreError::WrongKind {
            id: *id,
            expected: ObjectKind::Commit,
            actual: other.kind(),
        }),
        None => Err(StoreError::ObjectNotFound(*id)),
    }
}

pub(crate) fn lookup_tree<B: ObjectBackend + ?Sized>(
    backend: &B,
    id: &ObjectId,
) -> Result<Vec<TreeEntry>, StoreError> {
    match backend.get_object(id)? {
        Some(StoredObject::Tree(entries)) => Ok(entries),
        Some(other) => Err(StoreError::WrongKind {
            id: *id,
            expected: ObjectKind::Tree,
            actual: other.kind(),
        }),
        None => Err(StoreError::ObjectNotFound(*id)),
    }
}

pub(crate) fn object_info<B: ObjectBackend + ?Sized>(
    backend: &B,
    id: &ObjectId,
) -> Result<ObjectInfo, StoreError> {
    backend
        .get_info(id)?
        .ok_or(StoreError::ObjectNotFound(*id))
}

pub(crate) fn read_blob<B: ObjectBackend + ?Sized>(
    backend: &B,
    id: &ObjectId,
) -> Result<Vec<u8>, StoreError> {
    match backend.get_object(id)? {
        Some(StoredObject::Blob(content)) => Ok(content),
        Some(other) => Err(StoreError::WrongKind {
            id: *id,
            expected: ObjectKind::Blob,
            actual: other.kind(),
        }),
        None => Err(StoreError::ObjectNotFound(*id)),
    }
}
