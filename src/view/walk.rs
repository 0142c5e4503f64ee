//! Tree traversal and the tree page entry point

use crate::error::{StoreError, ViewError};
use crate::html::Html;
use crate::store::ObjectStore;
use crate::types::{ObjectId, TreeEntry, WalkState};
use crate::view::blob::print_object;
use crate::view::layout::{self, Page};
use crate::view::listing::ls_tree;
use crate::view::{normalize_path, revision_error, RenderContext};
use std::io::{self, Write};
use std::ops::ControlFlow;
use tracing::{debug, instrument};

/// What the traversal does after a visitor has seen an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Enter the entry (directories only; ignored for anything else)
    Descend,
    /// Move on to the next sibling
    Skip,
    /// Stop the whole traversal
    Abort,
}

/// Callback for `walk_tree`
pub trait TreeVisitor {
    type Error: From<StoreError>;

    /// `base` is the accumulated path of the containing tree, empty or
    /// ending in `/`.
    fn visit(&mut self, base: &str, entry: &TreeEntry) -> Result<Visit, Self::Error>;
}

/// Depth-first traversal in store order. Returns `Break` when a visitor
/// aborted.
pub fn walk_tree<S, V>(
    store: &S,
    tree: &ObjectId,
    base: &str,
    visitor: &mut V,
) -> Result<ControlFlow<()>, V::Error>
where
    S: ObjectStore + ?Sized,
    V: TreeVisitor,
{
    let entries = store.lookup_tree(tree)?;
    for entry in &entries {
        match visitor.visit(base, entry)? {
            Visit::Skip => {}
            Visit::Abort => return Ok(ControlFlow::Break(())),
            Visit::Descend if entry.mode.is_dir() => {
                let child_base = format!("{}{}/", base, entry.name);
                if walk_tree(store, &entry.id, &child_base, visitor)?.is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
            Visit::Descend => {}
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// Finds the entry named by the request path and renders it.
struct PathResolver<'r, 'a, S: ObjectStore + ?Sized, W: Write> {
    ctx: &'r RenderContext<'a, S>,
    out: &'r mut Html<W>,
    page: &'r mut Page,
    rev: &'r str,
    match_path: &'r str,
    use_render: bool,
    state: WalkState,
}

impl<S: ObjectStore + ?Sized, W: Write> TreeVisitor for PathResolver<'_, '_, S, W> {
    type Error = ViewError;

    fn visit(&mut self, base: &str, entry: &TreeEntry) -> Result<Visit, ViewError> {
        let full = format!("{}{}", base, entry.name);

        if full == self.match_path {
            if entry.mode.is_dir() {
                self.state = WalkState::ListingDirectory;
                self.page.set_title_from_path(&full);
                ls_tree(self.ctx, self.out, &entry.id, Some(&full), self.rev)?;
            } else {
                self.state = WalkState::RenderedBlob;
                print_object(
                    self.ctx,
                    self.out,
                    self.page,
                    &entry.id,
                    &full,
                    &entry.name,
                    self.rev,
                    self.use_render,
                    false,
                )?;
            }
            return Ok(Visit::Abort);
        }

        let on_the_way = self
            .match_path
            .strip_prefix(full.as_str())
            .map_or(false, |rest| rest.starts_with('/'));
        if entry.mode.is_dir() && on_the_way {
            Ok(Visit::Descend)
        } else {
            Ok(Visit::Skip)
        }
    }
}

/// Show a tree or a blob.
///
/// `rev` defaults to the query head. Without a path the root listing is
/// rendered; otherwise the path is resolved and the directory listing or
/// the blob is rendered.
#[instrument(skip_all, fields(rev = ?rev, path = ?path, use_render = use_render))]
pub fn print_tree<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    page: &mut Page,
    rev: Option<&str>,
    path: Option<&str>,
    use_render: bool,
) -> Result<WalkState, ViewError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let rev = rev.unwrap_or(&ctx.query.head);
    let root = ctx
        .store
        .resolve_revision(rev)
        .map_err(|e| revision_error(rev, e))?;

    let Some(match_path) = normalize_path(path) else {
        ls_tree(ctx, out, &root, None, rev)?;
        return Ok(WalkState::ListingDirectory);
    };

    let mut resolver = PathResolver {
        ctx,
        out,
        page,
        rev,
        match_path: &match_path,
        use_render,
        state: WalkState::Searching,
    };
    walk_tree(ctx.store, &root, "", &mut resolver)?;

    match resolver.state {
        WalkState::Searching => Err(ViewError::NotFound("Path not found".to_string())),
        state => {
            debug!(?state, "Tree walk finished");
            Ok(state)
        }
    }
}

/// `print_tree` with errors rendered as an error page.
///
/// Returns `None` when an error page was written; `page` then carries the
/// status. Only failures of the output itself are returned as errors.
pub fn tree_page<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    page: &mut Page,
    rev: Option<&str>,
    path: Option<&str>,
    use_render: bool,
) -> io::Result<Option<WalkState>>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let result = print_tree(ctx, out, page, rev, path, use_render);
    layout::page_or_error(out, page, result)
}
