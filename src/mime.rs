//! Filename → mimetype lookup

use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Extension-keyed mimetype table
///
/// Configured entries win over entries read from a `mime.types` file.
/// Extensions are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MimeTypes {
    configured: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl MimeTypes {
    pub fn new(configured: &HashMap<String, String>) -> Self {
        Self {
            configured: configured
                .iter()
                .map(|(ext, mime)| (ext.to_ascii_lowercase(), mime.clone()))
                .collect(),
            fallback: HashMap::new(),
        }
    }

    /// Load fallback entries from a `mime.types` file. A missing or unreadable
    /// file is logged and ignored.
    pub fn with_mime_types_file(mut self, path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => self.fallback = parse_mime_types(&contents),
            Err(e) => warn!(path = %path.display(), "Failed to read mimetype file: {}", e),
        }
        self
    }

    /// Mimetype for a filename, keyed by the text after its last `.`.
    pub fn lookup(&self, filename: &str) -> Option<&str> {
        let ext = extension(filename)?.to_ascii_lowercase();
        self.configured
            .get(&ext)
            .or_else(|| self.fallback.get(&ext))
            .map(String::as_str)
    }
}

/// Text after the last `.` of the final path segment, if any.
pub fn extension(filename: &str) -> Option<&str> {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    let (_, ext) = base.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Parse `type ext1 ext2 ...` lines; `#` starts a comment.
pub fn parse_mime_types(contents: &str) -> HashMap<String, String> {
    let mut table = HashMap::new();
    for line in contents.lines() {
        let line = line.split('#').next().unwrap_or("");
        let mut fields = line.split_whitespace();
        let Some(mimetype) = fields.next() else {
            continue;
        };
        for ext in fields {
            table
                .entry(ext.to_ascii_lowercase())
                .or_insert_with(|| mimetype.to_string());
        }
    }
    table
}
