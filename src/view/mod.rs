//! Tree and blob views
//!
//! One rendering pass reads from an `ObjectStore` and writes HTML into an
//! explicit `Html<W>` sink. The page title and status travel in a `Page`
//! owned by the caller; everything else a renderer needs is in
//! `RenderContext`.

pub mod blob;
pub mod breadcrumb;
pub mod document;
pub mod layout;
pub mod listing;
pub mod log;
pub mod walk;

pub use blob::print_object;
pub use layout::Page;
pub use listing::ls_tree;
pub use log::{log_page, print_log, LogRequest};
pub use walk::{print_tree, tree_page, walk_tree, TreeVisitor, Visit};

use crate::classify::BinaryClassifier;
use crate::config::{RepoConfig, SiteConfig};
use crate::error::{StoreError, ViewError};
use crate::filter::{Filter, FilterRegistry};
use crate::links::LinkBuilder;
use crate::mime::{self, MimeTypes};
use crate::store::ObjectStore;
use tracing::warn;

/// Per-request query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Branch the request is browsing
    pub head: String,
    /// Carry the full-message toggle into log links
    pub show_msg: bool,
}

impl Query {
    pub fn new(head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            show_msg: false,
        }
    }
}

/// Read-only collaborators shared by every renderer in one pass
pub struct RenderContext<'a, S: ObjectStore + ?Sized> {
    pub store: &'a S,
    pub site: &'a SiteConfig,
    pub repo: &'a RepoConfig,
    pub filters: &'a FilterRegistry,
    pub mimetypes: &'a MimeTypes,
    pub classifier: &'a dyn BinaryClassifier,
    pub query: &'a Query,
}

impl<'a, S: ObjectStore + ?Sized> RenderContext<'a, S> {
    pub fn links(&self) -> LinkBuilder<'_> {
        LinkBuilder::new(self.site, self.repo, &self.query.head)
    }

    /// Render filter configured for the file's extension.
    pub fn render_filter_for(&self, path: &str) -> Option<&'a dyn Filter> {
        let ext = mime::extension(path)?;
        let name = self.repo.render_filter_for(ext)?;
        let filter = self.filters.get(name);
        if filter.is_none() {
            warn!(filter = name, ext, "Render filter is not registered");
        }
        filter
    }
}

/// Page error for a revision that failed to resolve.
pub(crate) fn revision_error(rev: &str, err: StoreError) -> ViewError {
    match err {
        StoreError::InvalidRevision(_) => {
            ViewError::NotFound(format!("Invalid revision name: {}", rev))
        }
        StoreError::InvalidCommit(_) => {
            ViewError::NotFound(format!("Invalid commit reference: {}", rev))
        }
        other => ViewError::Store(other),
    }
}

/// Request paths ignore leading, trailing and repeated `/`; an empty path
/// is the root.
pub fn normalize_path(path: Option<&str>) -> Option<String> {
    let joined = path?
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
