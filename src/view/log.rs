//! Commit log
//!
//! Walks the commit graph from a revision and lists one row per commit: the
//! abbreviated id, linking to the tree at that commit, and the subject.
//! With a path, only commits that change the entry at that path are listed.
//! The page ends in a pager with `[prev]` and `[next]` links.

use crate::error::{StoreError, ViewError};
use crate::html::Html;
use crate::store::ObjectStore;
use crate::types::{Commit, FileMode, ObjectId, TreeEntry};
use crate::view::layout::{self, Page};
use crate::view::walk::{walk_tree, TreeVisitor, Visit};
use crate::view::{normalize_path, revision_error, RenderContext};
use std::collections::{HashSet, VecDeque};
use std::io::{self, Write};
use tracing::{debug, instrument};

/// Which slice of the history a log page shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogRequest<'r> {
    /// Starting revision; the query head when unset
    pub rev: Option<&'r str>,
    /// Only commits changing this path
    pub path: Option<&'r str>,
    /// Matching commits to skip
    pub ofs: usize,
    /// Commits per page; the site's `max_commit_count` when unset
    pub count: Option<usize>,
}

/// Commits reachable from a tip, each once, breadth first in parent order.
struct History<'s, S: ObjectStore + ?Sized> {
    store: &'s S,
    queue: VecDeque<ObjectId>,
    seen: HashSet<ObjectId>,
}

impl<'s, S: ObjectStore + ?Sized> History<'s, S> {
    fn new(store: &'s S, tip: ObjectId) -> Self {
        Self {
            store,
            queue: VecDeque::from([tip]),
            seen: HashSet::from([tip]),
        }
    }

    fn next_commit(&mut self) -> Result<Option<(ObjectId, Commit)>, StoreError> {
        let Some(id) = self.queue.pop_front() else {
            return Ok(None);
        };
        let commit = self.store.read_commit(&id)?;
        for parent in &commit.parents {
            if self.seen.insert(*parent) {
                self.queue.push_back(*parent);
            }
        }
        Ok(Some((id, commit)))
    }

    /// Next commit that changes `path`, or the next commit at all.
    fn next_matching(&mut self, path: Option<&str>) -> Result<Option<(ObjectId, Commit)>, StoreError> {
        while let Some((id, commit)) = self.next_commit()? {
            match path {
                Some(path) if !changes_path(self.store, &commit, path)? => continue,
                _ => return Ok(Some((id, commit))),
            }
        }
        Ok(None)
    }
}

/// Records the entry at one path of a tree.
struct EntryFinder<'p> {
    path: &'p str,
    found: Option<(FileMode, ObjectId)>,
}

impl TreeVisitor for EntryFinder<'_> {
    type Error = StoreError;

    fn visit(&mut self, base: &str, entry: &TreeEntry) -> Result<Visit, StoreError> {
        let full = format!("{}{}", base, entry.name);
        if full == self.path {
            self.found = Some((entry.mode, entry.id));
            return Ok(Visit::Abort);
        }
        let on_the_way = self
            .path
            .strip_prefix(full.as_str())
            .map_or(false, |rest| rest.starts_with('/'));
        if entry.mode.is_dir() && on_the_way {
            Ok(Visit::Descend)
        } else {
            Ok(Visit::Skip)
        }
    }
}

fn entry_at<S: ObjectStore + ?Sized>(
    store: &S,
    tree: &ObjectId,
    path: &str,
) -> Result<Option<(FileMode, ObjectId)>, StoreError> {
    let mut finder = EntryFinder { path, found: None };
    walk_tree(store, tree, "", &mut finder)?;
    Ok(finder.found)
}

/// Whether `commit` differs from its first parent at `path`. A root commit
/// changes every path it contains.
fn changes_path<S: ObjectStore + ?Sized>(
    store: &S,
    commit: &Commit,
    path: &str,
) -> Result<bool, StoreError> {
    let here = entry_at(store, &commit.tree, path)?;
    let before = match commit.parents.first() {
        Some(parent) => entry_at(store, &store.read_commit(parent)?.tree, path)?,
        None => None,
    };
    Ok(here != before)
}

/// First line, then the rest without surrounding blank lines.
fn split_message(message: &str) -> (&str, &str) {
    match message.split_once('\n') {
        Some((subject, body)) => (subject, body.trim()),
        None => (message, ""),
    }
}

fn print_commit<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    id: &ObjectId,
    commit: &Commit,
    path: Option<&str>,
) -> io::Result<()>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let hex = id.to_hex();
    let (subject, body) = split_message(&commit.message);

    out.html("<tr><td class='sha1'>")?;
    ctx.links()
        .tree_link(out, &id.short_hex(), None, Some(&hex), path)?;
    out.html("</td><td>")?;
    out.text(subject)?;
    out.html("</td></tr>\n")?;

    if ctx.query.show_msg && !body.is_empty() {
        out.html("<tr class='nohover'><td/><td class='logmsg'>\n")?;
        out.text(body)?;
        out.html("</td></tr>\n")?;
    }
    Ok(())
}

/// Render one page of the log. Returns the number of commits listed.
#[instrument(skip_all, fields(rev = ?req.rev, path = ?req.path, ofs = req.ofs))]
pub fn print_log<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    page: &mut Page,
    req: &LogRequest<'_>,
) -> Result<usize, ViewError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let rev = req.rev.unwrap_or(&ctx.query.head);
    let tip = ctx
        .store
        .resolve_commit(rev)
        .map_err(|e| revision_error(rev, e))?;
    let path = normalize_path(req.path);
    let path = path.as_deref();
    let count = req.count.unwrap_or(ctx.site.max_commit_count).max(1);
    let show_msg = ctx.query.show_msg;
    let links = ctx.links();

    // Walk before writing anything so a store failure leaves no partial page.
    let mut history = History::new(ctx.store, tip);
    for _ in 0..req.ofs {
        if history.next_matching(path)?.is_none() {
            break;
        }
    }
    let mut commits = Vec::with_capacity(count);
    while commits.len() < count {
        match history.next_matching(path)? {
            Some(found) => commits.push(found),
            None => break,
        }
    }
    let has_more = history.next_matching(path)?.is_some();
    debug!(shown = commits.len(), has_more, "Collected log page");

    if let Some(path) = path {
        page.set_title_from_path(path);
    }
    layout::start(out)?;
    out.html("<table class='list nowrap'>")?;
    out.html("<tr class='nohover'><th class='left'>Commit</th><th class='left'>Commit message (")?;
    let toggle = if show_msg { "Collapse" } else { "Expand" };
    links.log_page_link(out, toggle, None, req.rev, path, req.ofs, !show_msg)?;
    out.html(")</th></tr>\n")?;

    for (id, commit) in &commits {
        print_commit(ctx, out, id, commit, path)?;
    }

    out.html("</table><ul class='pager'>")?;
    if req.ofs > 0 {
        out.html("<li>")?;
        let prev = req.ofs.saturating_sub(count);
        links.log_page_link(out, "[prev]", None, req.rev, path, prev, show_msg)?;
        out.html("</li>")?;
    }
    if has_more {
        out.html("<li>")?;
        links.log_page_link(out, "[next]", None, req.rev, path, req.ofs + count, show_msg)?;
        out.html("</li>")?;
    }
    out.html("</ul>")?;
    layout::end(out)?;
    Ok(commits.len())
}

/// `print_log` with errors rendered as an error page.
pub fn log_page<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    page: &mut Page,
    req: &LogRequest<'_>,
) -> io::Result<Option<usize>>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let result = print_log(ctx, out, page, req);
    layout::page_or_error(out, page, result)
}
