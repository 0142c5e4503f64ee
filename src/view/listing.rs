//! Directory listing

use crate::error::{StoreError, ViewError};
use crate::html::Html;
use crate::store::ObjectStore;
use crate::types::{ObjectId, ObjectKind, TreeEntry};
use crate::view::breadcrumb::write_tree_link;
use crate::view::layout;
use crate::view::walk::{walk_tree, TreeVisitor, Visit};
use crate::view::RenderContext;
use std::io::{self, Write};
use tracing::warn;

pub fn ls_head<W: Write>(out: &mut Html<W>) -> io::Result<()> {
    layout::start(out)?;
    out.html("<table summary='tree listing' class='list'>\n")?;
    out.html("<tr class='nohover'>")?;
    out.html("<th class='left'>Mode</th>")?;
    out.html("<th class='left'>Name</th>")?;
    out.html("<th class='right'>Size</th>")?;
    out.html("<th/>")?;
    out.html("</tr>\n")
}

pub fn ls_tail<W: Write>(out: &mut Html<W>) -> io::Result<()> {
    out.html("</table>\n")?;
    layout::end(out)
}

/// One listing row for `entry`, a child of the directory at `prefix`.
///
/// A child whose metadata cannot be read gets a "Bad object" row instead;
/// the listing goes on.
pub fn ls_item<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    rev: &str,
    prefix: Option<&str>,
    entry: &TreeEntry,
) -> Result<(), ViewError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let fullpath = match prefix {
        Some(prefix) => format!("{}/{}", prefix, entry.name),
        None => entry.name.clone(),
    };

    let mut size = None;
    if !entry.mode.is_submodule() {
        match ctx.store.object_info(&entry.id) {
            Ok(info) if info.kind == ObjectKind::Blob => size = Some(info.size),
            Ok(_) => {}
            Err(e) => {
                warn!(path = %fullpath, id = %entry.id.short_hex(), error = %e, "Bad object in listing");
                out.html("<tr><td colspan='3'>Bad object: ")?;
                out.text(&entry.name)?;
                out.fmt(format_args!(" {}</td></tr>", entry.id))?;
                return Ok(());
            }
        }
    }

    let links = ctx.links();
    out.html("<tr><td class='ls-mode'>")?;
    out.html(&entry.mode.glyph())?;
    out.html("</td><td>")?;
    if entry.mode.is_submodule() {
        links.submodule_link(out, Some("ls-mod"), &fullpath, &entry.id)?;
    } else if entry.mode.is_dir() {
        write_tree_link(ctx, out, &entry.id, &entry.name, rev, &fullpath)?;
    } else {
        let class = match entry.name.rsplit_once('.') {
            Some((_, ext)) => format!("ls-blob {}", ext),
            None => "ls-blob".to_string(),
        };
        links.tree_link(out, &entry.name, Some(&class), Some(rev), Some(&fullpath))?;
    }
    match size {
        Some(size) => out.fmt(format_args!("</td><td class='ls-size'>{}</td>", size))?,
        None => out.html("</td><td class='ls-size'></td>")?,
    }

    out.html("<td>")?;
    links.log_link(
        out,
        "log",
        Some("button"),
        Some(rev),
        Some(&fullpath),
        ctx.query.show_msg,
    )?;
    if ctx.repo.enable_stats {
        links.stats_link(out, "stats", Some("button"), Some(&fullpath))?;
    }
    if !entry.mode.is_submodule() {
        links.plain_link(out, "plain", Some("button"), Some(rev), Some(&fullpath))?;
    }
    if !entry.mode.is_dir() && ctx.site.enable_blame {
        links.blame_link(out, "blame", Some("button"), Some(rev), Some(&fullpath))?;
    }
    out.html("</td></tr>\n")?;
    Ok(())
}

/// Writes one row per immediate child.
struct Listing<'r, 'a, S: ObjectStore + ?Sized, W: Write> {
    ctx: &'r RenderContext<'a, S>,
    out: &'r mut Html<W>,
    rev: &'r str,
    prefix: Option<&'r str>,
}

impl<S: ObjectStore + ?Sized, W: Write> TreeVisitor for Listing<'_, '_, S, W> {
    type Error = ViewError;

    fn visit(&mut self, _base: &str, entry: &TreeEntry) -> Result<Visit, ViewError> {
        ls_item(self.ctx, self.out, self.rev, self.prefix, entry)?;
        Ok(Visit::Skip)
    }
}

/// Full listing of `tree`: layout start, table, one row per child, layout end.
pub fn ls_tree<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    tree: &ObjectId,
    prefix: Option<&str>,
    rev: &str,
) -> Result<(), ViewError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    match ctx.store.object_info(tree) {
        Ok(info) if info.kind == ObjectKind::Tree => {}
        Ok(_) | Err(StoreError::ObjectNotFound(_)) => {
            return Err(ViewError::NotFound(format!("Not a tree object: {}", tree)));
        }
        Err(e) => return Err(e.into()),
    }

    ls_head(out)?;
    let mut listing = Listing {
        ctx,
        out: &mut *out,
        rev,
        prefix,
    };
    walk_tree(ctx.store, tree, "", &mut listing)?;
    ls_tail(out)?;
    Ok(())
}
