//! Persistence layer: sled-backed object store

use crate::error::StoreError;
use crate::store::{self, ObjectBackend, ObjectStore, ObjectWriter, StoredObject};
use crate::types::{Commit, ObjectId, ObjectInfo, TreeEntry};
use std::path::Path;
use tracing::debug;

/// Sled-based implementation of the object store
///
/// Three keyspaces: `objects` (id → bincode `StoredObject`), `info`
/// (id → bincode `ObjectInfo`, so size lookups never load content) and
/// `refs` (name → raw id bytes).
pub struct SledObjectStore {
    db: sled::Db,
    objects: sled::Tree,
    info: sled::Tree,
    refs: sled::Tree,
}

fn sled_error(context: &str, err: sled::Error) -> StoreError {
    StoreError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{}: {}", context, err),
    ))
}

fn decode_error(context: &str, err: bincode::Error) -> StoreError {
    StoreError::IoError(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("{}: {}", context, err),
    ))
}

impl SledObjectStore {
    /// Open (or create) a store at the given directory
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| sled_error("Failed to open sled database", e))?;
        let objects = db
            .open_tree("objects")
            .map_err(|e| sled_error("Failed to open objects keyspace", e))?;
        let info = db
            .open_tree("info")
            .map_err(|e| sled_error("Failed to open info keyspace", e))?;
        let refs = db
            .open_tree("refs")
            .map_err(|e| sled_error("Failed to open refs keyspace", e))?;
        Ok(Self {
            db,
            objects,
            info,
            refs,
        })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Check if an object exists in the store
    pub fn contains(&self, id: &ObjectId) -> Result<bool, StoreError> {
        self.info
            .contains_key(id.as_bytes())
            .map_err(|e| sled_error("Failed to check object existence", e))
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| sled_error("Failed to flush database", e))?;
        Ok(())
    }
}

impl ObjectBackend for SledObjectStore {
    fn get_ref(&self, name: &str) -> Result<Option<ObjectId>, StoreError> {
        let value = self
            .refs
            .get(name.as_bytes())
            .map_err(|e| sled_error("Failed to read ref", e))?;
        match value {
            Some(bytes) => {
                let raw = <[u8; 32]>::try_from(&bytes[..]).map_err(|_| {
                    StoreError::Corrupt(format!("ref {} does not hold a 32-byte id", name))
                })?;
                Ok(Some(ObjectId::from_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    fn get_object(&self, id: &ObjectId) -> Result<Option<StoredObject>, StoreError> {
        let value = self
            .objects
            .get(id.as_bytes())
            .map_err(|e| sled_error("Failed to get object", e))?;
        match value {
            Some(bytes) => {
                let object: StoredObject = bincode::deserialize(&bytes)
                    .map_err(|e| decode_error("Failed to deserialize object", e))?;
                Ok(Some(object))
            }
            None => Ok(None),
        }
    }

    fn get_info(&self, id: &ObjectId) -> Result<Option<ObjectInfo>, StoreError> {
        let value = self
            .info
            .get(id.as_bytes())
            .map_err(|e| sled_error("Failed to get object info", e))?;
        match value {
            Some(bytes) => {
                let info: ObjectInfo = bincode::deserialize(&bytes)
                    .map_err(|e| decode_error("Failed to deserialize object info", e))?;
                Ok(Some(info))
            }
            None => Ok(None),
        }
    }

    fn list_refs(&self) -> Result<Vec<(String, ObjectId)>, StoreError> {
        let mut refs = Vec::new();
        for item in self.refs.iter() {
            let (key, value) = item.map_err(|e| sled_error("Failed to iterate refs", e))?;
            let name = String::from_utf8_lossy(&key).into_owned();
            let raw = <[u8; 32]>::try_from(&value[..]).map_err(|_| {
                StoreError::Corrupt(format!("ref {} does not hold a 32-byte id", name))
            })?;
            refs.push((name, ObjectId::from_bytes(raw)));
        }
        Ok(refs)
    }
}

impl ObjectStore for SledObjectStore {
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

impl ObjectWriter for SledObjectStore {
    fn write_object(&self, object: StoredObject) -> Result<ObjectId, StoreError> {
        let id = object.id();
        if self.contains(&id)? {
            return Ok(id);
        }

        let info = bincode::serialize(&object.info())
            .map_err(|e| decode_error("Failed to serialize object info", e))?;
        let value = bincode::serialize(&object)
            .map_err(|e| decode_error("Failed to serialize object", e))?;

        // Object first: an info record must never point at a missing payload.
        self.objects
            .insert(id.as_bytes(), value)
            .map_err(|e| sled_error("Failed to put object", e))?;
        self.info
            .insert(id.as_bytes(), info)
            .map_err(|e| sled_error("Failed to put object info", e))?;

        debug!(id = %id.short_hex(), kind = %object.kind(), "Stored object");
        Ok(id)
    }

    fn update_ref(&self, name: &str, target: ObjectId) -> Result<(), StoreError> {
        self.refs
            .insert(name.as_bytes(), &target.as_bytes()[..])
            .map_err(|e| sled_error("Failed to update ref", e))?;
        Ok(())
    }
}
