//! Breadcrumb collapsing for chains of single-directory trees
//!
//! A directory whose only child is another directory is shown as
//! `outer / inner` in one row, each part linking to its own tree page.

use crate::error::{StoreError, ViewError};
use crate::html::Html;
use crate::store::ObjectStore;
use crate::types::{ObjectId, TreeEntry};
use crate::view::walk::{walk_tree, TreeVisitor, Visit};
use crate::view::RenderContext;
use std::io::Write;
use tracing::debug;

/// Counts entries of one tree level, stopping as soon as the answer to
/// "is there exactly one child and is it a directory" is known.
#[derive(Default)]
struct SingleChildCounter {
    count: usize,
    child: Option<TreeEntry>,
}

impl TreeVisitor for SingleChildCounter {
    type Error = StoreError;

    fn visit(&mut self, _base: &str, entry: &TreeEntry) -> Result<Visit, StoreError> {
        self.count += 1;
        if self.count > 1 {
            return Ok(Visit::Abort);
        }
        if !entry.mode.is_dir() {
            self.count = 2;
            return Ok(Visit::Abort);
        }
        self.child = Some(entry.clone());
        Ok(Visit::Skip)
    }
}

/// The only child of `tree` when it has exactly one child and that child
/// is a directory. Store failures count as "no".
pub fn single_child_dir<S: ObjectStore + ?Sized>(store: &S, tree: &ObjectId) -> Option<TreeEntry> {
    let mut counter = SingleChildCounter::default();
    match walk_tree(store, tree, "", &mut counter) {
        Ok(_) if counter.count == 1 => counter.child,
        Ok(_) => None,
        Err(e) => {
            debug!(tree = %tree.short_hex(), error = %e, "Stopped collapsing directory chain");
            None
        }
    }
}

/// Tree link for the directory `name` at `fullpath`, followed by
/// ` / child` links while each level has a single directory child.
pub fn write_tree_link<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    id: &ObjectId,
    name: &str,
    rev: &str,
    fullpath: &str,
) -> Result<(), ViewError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let links = ctx.links();
    let mut path = fullpath.to_string();
    let mut name = name.to_string();
    let mut id = *id;

    loop {
        links.tree_link(out, &name, Some("ls-dir"), Some(rev), Some(&path))?;

        let Some(child) = single_child_dir(ctx.store, &id) else {
            break;
        };
        out.html(" / ")?;
        path.push('/');
        path.push_str(&child.name);
        name = child.name;
        id = child.id;
    }
    Ok(())
}
