//! Core object model shared by the store and view layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hex digits shown for abbreviated object ids.
pub const SHORT_ID_LEN: usize = 7;

/// Content identifier for any stored object (BLAKE3 of its typed encoding).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex form used in link text.
    pub fn short_hex(&self) -> String {
        let mut full = self.to_hex();
        full.truncate(SHORT_ID_LEN);
        full
    }

    /// Parse a full 64-digit hex id. Abbreviations are not accepted.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

/// Kind of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        })
    }
}

/// Metadata returned by a size/kind lookup. Never carries content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub kind: ObjectKind,
    pub size: u64,
}

/// Mode of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileMode {
    Regular,
    Executable,
    Symlink,
    Directory,
    /// Link to a commit in another repository
    Submodule,
}

impl FileMode {
    /// Unix-style mode bits, as a tree encoding would record them.
    pub fn bits(self) -> u32 {
        match self {
            FileMode::Regular => 0o100644,
            FileMode::Executable => 0o100755,
            FileMode::Symlink => 0o120000,
            FileMode::Directory => 0o040000,
            FileMode::Submodule => 0o160000,
        }
    }

    pub fn is_dir(self) -> bool {
        self == FileMode::Directory
    }

    pub fn is_submodule(self) -> bool {
        self == FileMode::Submodule
    }

    /// Mode glyph: a type character followed by three `rwx` triplets.
    pub fn glyph(self) -> String {
        let kind = match self {
            FileMode::Directory => 'd',
            FileMode::Symlink => 'l',
            FileMode::Submodule => 'm',
            FileMode::Regular | FileMode::Executable => '-',
        };
        let bits = self.bits();
        let mut out = String::with_capacity(10);
        out.push(kind);
        for shift in [6, 3, 0] {
            let perm = (bits >> shift) & 0o7;
            out.push(if perm & 4 != 0 { 'r' } else { '-' });
            out.push(if perm & 2 != 0 { 'w' } else { '-' });
            out.push(if perm & 1 != 0 { 'x' } else { '-' });
        }
        out
    }
}

/// One named child of a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub mode: FileMode,
    pub id: ObjectId,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, mode: FileMode, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            mode,
            id,
        }
    }
}

/// Commit object: a root tree plus a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub message: String,
}

/// Progress of a single tree walk. Moves out of `Searching` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Searching,
    ListingDirectory,
    RenderedBlob,
}
