//! Filesystem importer: snapshots a directory into an object store

use crate::error::StoreError;
use crate::store::{ObjectBackend, ObjectWriter, StoredObject};
use crate::types::{FileMode, ObjectId, TreeEntry};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

/// Importer configuration
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Whether to follow symbolic links (default: false, links are stored as symlink blobs)
    pub follow_symlinks: bool,
    /// Path components to skip (e.g., ".git")
    pub ignore_patterns: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: vec![".git".to_string()],
        }
    }
}

/// Imports a directory tree bottom-up: blobs first, then each directory once
/// all of its children have ids, then the root.
pub struct TreeImporter<'a, W: ObjectWriter + ?Sized> {
    root: PathBuf,
    config: ImportConfig,
    writer: &'a W,
}

fn io_error(context: String, err: impl std::fmt::Display) -> StoreError {
    StoreError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{}: {}", context, err),
    ))
}

impl<'a, W: ObjectWriter + ?Sized> TreeImporter<'a, W> {
    pub fn new(root: impl Into<PathBuf>, writer: &'a W) -> Self {
        Self {
            root: root.into(),
            config: ImportConfig::default(),
            writer,
        }
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    /// Write every file and directory under the root; returns the root tree id.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn import_tree(&self) -> Result<ObjectId, StoreError> {
        let start = Instant::now();
        let root = dunce::canonicalize(&self.root)
            .map_err(|e| io_error(format!("Failed to canonicalize {:?}", self.root), e))?;

        // Children are yielded before their directory, so each directory's
        // entries are complete by the time the directory itself comes up.
        let walker = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .contents_first(true)
            .sort_by_file_name();

        let mut pending: HashMap<PathBuf, Vec<RawEntry>> = HashMap::new();
        let mut root_id = None;
        let mut object_count = 0usize;

        for entry in walker {
            let entry = entry.map_err(|e| io_error("Failed to walk directory".to_string(), e))?;
            let path = entry.path();

            if entry.depth() > 0 && self.should_ignore(path.strip_prefix(&root).unwrap_or(path)) {
                continue;
            }

            let file_type = entry.file_type();
            let (mode, id) = if file_type.is_dir() {
                let children = pending.remove(path).unwrap_or_default();
                let id = self.writer.write_tree(settle_names(path, children))?;
                if entry.depth() == 0 {
                    root_id = Some(id);
                    object_count += 1;
                    continue;
                }
                (FileMode::Directory, id)
            } else if file_type.is_symlink() {
                let target = std::fs::read_link(path)
                    .map_err(|e| io_error(format!("Failed to read link {:?}", path), e))?;
                let id = self
                    .writer
                    .write_blob(target.to_string_lossy().as_bytes())?;
                (FileMode::Symlink, id)
            } else if file_type.is_file() {
                let content = std::fs::read(path)
                    .map_err(|e| io_error(format!("Failed to read file {:?}", path), e))?;
                let metadata = entry
                    .metadata()
                    .map_err(|e| io_error(format!("Failed to read metadata for {:?}", path), e))?;
                let mode = if is_executable(&metadata) {
                    FileMode::Executable
                } else {
                    FileMode::Regular
                };
                (mode, self.writer.write_blob(&content)?)
            } else {
                trace!(path = %path.display(), "Skipping special file");
                continue;
            };

            object_count += 1;
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            pending.entry(parent).or_default().push(RawEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                mode,
                id,
            });
        }

        let root_id = root_id.ok_or_else(|| {
            StoreError::Corrupt(format!("Import root {:?} is not a directory", root))
        })?;

        info!(
            objects = object_count,
            root_id = %root_id.short_hex(),
            duration_ms = start.elapsed().as_millis(),
            "Import completed"
        );
        Ok(root_id)
    }

    /// Check if a root-relative path matches an ignore pattern
    fn should_ignore(&self, relative: &Path) -> bool {
        relative.components().any(|component| match component {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                self.config
                    .ignore_patterns
                    .iter()
                    .any(|pattern| pattern.as_str() == name)
            }
            _ => false,
        })
    }
}

impl<'a, W: ObjectWriter + ObjectBackend + ?Sized> TreeImporter<'a, W> {
    /// Import the tree and record it as a new commit on `ref_name`.
    ///
    /// The previous target of the ref, when it is a commit, becomes the parent.
    pub fn import_commit(&self, ref_name: &str, message: &str) -> Result<ObjectId, StoreError> {
        let tree = self.import_tree()?;
        let parents = match self.writer.get_ref(ref_name)? {
            Some(previous) => match self.writer.get_object(&previous)? {
                Some(StoredObject::Commit(_)) => vec![previous],
                _ => Vec::new(),
            },
            None => Vec::new(),
        };
        let commit = self.writer.write_commit(tree, parents, message)?;
        self.writer.update_ref(ref_name, commit)?;
        debug!(ref_name, commit = %commit.short_hex(), "Updated ref");
        Ok(commit)
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    false
}

/// A directory child as read from disk, before its name is settled.
struct RawEntry {
    name: String,
    mode: FileMode,
    id: ObjectId,
}

/// Turn a directory's children into tree entries with NFC names.
///
/// Names already in NFC are kept first. Another name takes its NFC form only
/// when that is still free and otherwise keeps its on-disk spelling, so two
/// files that differ only in normalization both survive. A child whose name
/// still collides (lossy decoding of non-UTF-8 names) is skipped.
fn settle_names(dir: &Path, children: Vec<RawEntry>) -> Vec<TreeEntry> {
    let (normalized, others): (Vec<_>, Vec<_>) = children
        .into_iter()
        .map(|child| {
            let nfc: String = child.name.nfc().collect();
            (nfc, child)
        })
        .partition(|(nfc, child)| *nfc == child.name);

    let mut taken = HashSet::new();
    let mut entries = Vec::with_capacity(normalized.len() + others.len());
    for (nfc, child) in normalized.into_iter().chain(others) {
        let name = if !taken.contains(&nfc) {
            nfc
        } else if !taken.contains(&child.name) {
            warn!(
                dir = %dir.display(),
                name = %child.name,
                "Name collides with another entry after normalization, keeping it as is"
            );
            child.name
        } else {
            warn!(dir = %dir.display(), name = %child.name, "Skipping entry with duplicate name");
            continue;
        };
        taken.insert(name.clone());
        entries.push(TreeEntry::new(name, child.mode, child.id));
    }
    entries
}
