//! Object encoding and id computation using BLAKE3
//!
//! ObjectId = hash(kind || " " || payload_len || "\0" || payload)
//!
//! The header makes ids of different kinds disjoint even for identical
//! payloads, and the payload encodings are canonical so equal content always
//! yields an equal id.

use crate::types::{Commit, ObjectId, ObjectKind, TreeEntry};
use blake3::Hasher;

/// Compute the id of an already-encoded object payload
pub fn compute_object_id(kind: ObjectKind, payload: &[u8]) -> ObjectId {
    let mut hasher = Hasher::new();

    // Kind discriminator
    hasher.update(kind.to_string().as_bytes());
    hasher.update(b" ");

    // Payload length, decimal, NUL terminated
    hasher.update(payload.len().to_string().as_bytes());
    hasher.update(b"\0");

    hasher.update(payload);

    ObjectId::from_bytes(*hasher.finalize().as_bytes())
}

/// Canonical tree payload
///
/// Each entry: octal mode, space, name, NUL, 32 raw id bytes. Entries must
/// already be in store order (sorted by name bytes).
pub fn encode_tree(entries: &[TreeEntry]) -> Vec<u8> {
    let mut out = Vec::with_capacity(entries.len() * 48);
    for entry in entries {
        out.extend_from_slice(format!("{:o} ", entry.mode.bits()).as_bytes());
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.id.as_bytes());
    }
    out
}

/// Canonical commit payload
pub fn encode_commit(commit: &Commit) -> Vec<u8> {
    let mut out = String::new();
    out.push_str("tree ");
    out.push_str(&commit.tree.to_hex());
    out.push('\n');
    for parent in &commit.parents {
        out.push_str("parent ");
        out.push_str(&parent.to_hex());
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&commit.message);
    out.into_bytes()
}

pub fn compute_blob_id(content: &[u8]) -> ObjectId {
    compute_object_id(ObjectKind::Blob, content)
}

pub fn compute_tree_id(entries: &[TreeEntry]) -> ObjectId {
    compute_object_id(ObjectKind::Tree, &encode_tree(entries))
}

pub fn compute_commit_id(commit: &Commit) -> ObjectId {
    compute_object_id(ObjectKind::Commit, &encode_commit(commit))
}
