//! In-memory object store

use crate::error::StoreError;
use crate::store::{self, ObjectBackend, ObjectStore, ObjectWriter, StoredObject};
use crate::types::{Commit, ObjectId, ObjectInfo, TreeEntry};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Object store held entirely in memory
///
/// Interior locking lets importers write through `&self` and lets a
/// populated store be shared read-only between renderers.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
    refs: RwLock<BTreeMap<String, ObjectId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.read().contains_key(id)
    }

    /// Drop an object, leaving any references to it dangling.
    pub fn remove(&self, id: &ObjectId) -> Option<StoredObject> {
        self.objects.write().remove(id)
    }
}

impl ObjectBackend for MemoryStore {
    fn get_ref(&self, name: &str) -> Result<Option<ObjectId>, StoreError> {
        Ok(self.refs.read().get(name).copied())
    }

    fn get_object(&self, id: &ObjectId) -> Result<Option<StoredObject>, StoreError> {
        Ok(self.objects.read().get(id).cloned())
    }

    fn get_info(&self, id: &ObjectId) -> Result<Option<ObjectInfo>, StoreError> {
        Ok(self.objects.read().get(id).map(StoredObject::info))
    }

    fn list_refs(&self) -> Result<Vec<(String, ObjectId)>, StoreError> {
        Ok(self
            .refs
            .read()
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect())
    }
}

impl ObjectStore for MemoryStore {
    fn resolve_revision(&self, name: &str) -> Result<ObjectId, StoreError> {
        store::resolve_revision(self, name)
    }

    fn lookup_tree(&self, id: &ObjectId) -> Result<Vec<TreeEntry>, StoreError> {
        store::lookup_tree(self, id)
    }

    fn object_info(&self, id: &ObjectId) -> Result<ObjectInfo, StoreError> {
        store::object_info(self, id)
    }

    fn read_blob(&self, id: &ObjectId) -> Result<Vec<u8>, StoreError> {
        store::read_blob(self, id)
    }

    fn resolve_commit(&self, name: &str) -> Result<ObjectId, StoreError> {
        store::resolve_commit(self, name)
    }

    fn read_commit(&self, id: &ObjectId) -> Result<Commit, StoreError> {
        store::read_commit(self, id)
    }
}

impl ObjectWriter for MemoryStore {
    fn write_object(&self, object: StoredObject) -> Result<ObjectId, StoreError> {
        let id = object.id();
        self.objects.write().entry(id).or_insert(object);
        Ok(id)
    }

    fn update_ref(&self, name: &str, target: ObjectId) -> Result<(), StoreError> {
        self.refs.write().insert(name.to_string(), target);
        Ok(())
    }
}
