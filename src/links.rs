//! Repository page links
//!
//! Two URL styles: under a virtual root, links are paths
//! (`ROOT` + repo url + `page/path`); otherwise they go through the script
//! with a `url=` query argument. Query parameters are joined with `&amp;`
//! since every link is written into an attribute.

use crate::config::{RepoConfig, SiteConfig};
use crate::html::Html;
use crate::types::ObjectId;
use std::io::{self, Write};

const QUERY_DELIM: &str = "&amp;";

/// Builds links to the pages of one repository for the current query.
#[derive(Debug, Clone, Copy)]
pub struct LinkBuilder<'a> {
    site: &'a SiteConfig,
    repo: &'a RepoConfig,
    head: &'a str,
}

impl<'a> LinkBuilder<'a> {
    /// `head` is the branch of the current query.
    pub fn new(site: &'a SiteConfig, repo: &'a RepoConfig, head: &'a str) -> Self {
        Self { site, repo, head }
    }

    /// Writes `<a [title] [class] href='…` up to and including the `h=`
    /// argument; returns the delimiter for the next query argument.
    fn repolink<W: Write>(
        &self,
        out: &mut Html<W>,
        class: Option<&str>,
        page: &str,
        path: Option<&str>,
    ) -> io::Result<&'static str> {
        out.html("<a")?;
        if let Some(class) = class {
            out.html(" class='")?;
            out.attr(class)?;
            out.html("'")?;
        }
        out.html(" href='")?;
        let delim = self.page_url(out, page, path)?;
        self.head_arg(out, delim)
    }

    /// Bare page URL without the `h=` argument; returns the next delimiter.
    fn page_url<W: Write>(
        &self,
        out: &mut Html<W>,
        page: &str,
        path: Option<&str>,
    ) -> io::Result<&'static str> {
        match &self.site.virtual_root {
            Some(root) => {
                out.url_path(root)?;
                if !root.ends_with('/') {
                    out.html("/")?;
                }
                out.url_path(&self.repo.url)?;
                if !self.repo.url.ends_with('/') {
                    out.html("/")?;
                }
                out.url_path(page)?;
                out.html("/")?;
                if let Some(path) = path {
                    out.url_path(path)?;
                }
                Ok("?")
            }
            None => {
                out.url_path(&self.site.script_name)?;
                out.html("?url=")?;
                out.url_arg(&self.repo.url)?;
                if !self.repo.url.ends_with('/') {
                    out.html("/")?;
                }
                out.url_arg(page)?;
                out.html("/")?;
                if let Some(path) = path {
                    out.url_arg(path)?;
                }
                Ok(QUERY_DELIM)
            }
        }
    }

    fn head_arg<W: Write>(&self, out: &mut Html<W>, delim: &'static str) -> io::Result<&'static str> {
        if self.head != self.repo.default_branch {
            out.html(delim)?;
            out.html("h=")?;
            out.url_arg(self.head)?;
            return Ok(QUERY_DELIM);
        }
        Ok(delim)
    }

    fn rev_arg<W: Write>(
        &self,
        out: &mut Html<W>,
        delim: &'static str,
        rev: Option<&str>,
    ) -> io::Result<&'static str> {
        match rev {
            Some(rev) if rev != self.head => {
                out.html(delim)?;
                out.html("id=")?;
                out.url_arg(rev)?;
                Ok(QUERY_DELIM)
            }
            _ => Ok(delim),
        }
    }

    fn close<W: Write>(&self, out: &mut Html<W>, name: &str) -> io::Result<()> {
        out.html("'>")?;
        out.text(name)?;
        out.html("</a>")
    }

    fn reporevlink<W: Write>(
        &self,
        out: &mut Html<W>,
        page: &str,
        name: &str,
        class: Option<&str>,
        rev: Option<&str>,
        path: Option<&str>,
    ) -> io::Result<()> {
        let delim = self.repolink(out, class, page, path)?;
        self.rev_arg(out, delim, rev)?;
        self.close(out, name)
    }

    pub fn tree_link<W: Write>(
        &self,
        out: &mut Html<W>,
        name: &str,
        class: Option<&str>,
        rev: Option<&str>,
        path: Option<&str>,
    ) -> io::Result<()> {
        self.reporevlink(out, "tree", name, class, rev, path)
    }

    pub fn source_link<W: Write>(
        &self,
        out: &mut Html<W>,
        name: &str,
        class: Option<&str>,
        rev: Option<&str>,
        path: Option<&str>,
    ) -> io::Result<()> {
        self.reporevlink(out, "source", name, class, rev, path)
    }

    pub fn plain_link<W: Write>(
        &self,
        out: &mut Html<W>,
        name: &str,
        class: Option<&str>,
        rev: Option<&str>,
        path: Option<&str>,
    ) -> io::Result<()> {
        self.reporevlink(out, "plain", name, class, rev, path)
    }

    pub fn blame_link<W: Write>(
        &self,
        out: &mut Html<W>,
        name: &str,
        class: Option<&str>,
        rev: Option<&str>,
        path: Option<&str>,
    ) -> io::Result<()> {
        self.reporevlink(out, "blame", name, class, rev, path)
    }

    /// Log link; `show_msg` carries the query's full-message toggle along.
    pub fn log_link<W: Write>(
        &self,
        out: &mut Html<W>,
        name: &str,
        class: Option<&str>,
        rev: Option<&str>,
        path: Option<&str>,
        show_msg: bool,
    ) -> io::Result<()> {
        self.log_page_link(out, name, class, rev, path, 0, show_msg)
    }

    /// Log link starting `ofs` commits into the history.
    #[allow(clippy::too_many_arguments)]
    pub fn log_page_link<W: Write>(
        &self,
        out: &mut Html<W>,
        name: &str,
        class: Option<&str>,
        rev: Option<&str>,
        path: Option<&str>,
        ofs: usize,
        show_msg: bool,
    ) -> io::Result<()> {
        let delim = self.repolink(out, class, "log", path)?;
        let mut delim = self.rev_arg(out, delim, rev)?;
        if ofs > 0 {
            out.html(delim)?;
            out.fmt(format_args!("ofs={}", ofs))?;
            delim = QUERY_DELIM;
        }
        if show_msg {
            out.html(delim)?;
            out.html("showmsg=1")?;
        }
        self.close(out, name)
    }

    /// Stats are per branch, never per revision.
    pub fn stats_link<W: Write>(
        &self,
        out: &mut Html<W>,
        name: &str,
        class: Option<&str>,
        path: Option<&str>,
    ) -> io::Result<()> {
        self.reporevlink(out, "stats", name, class, None, path)
    }

    /// URL of the raw content of `path`, as used for embedded images and
    /// frames.
    pub fn plain_url<W: Write>(&self, out: &mut Html<W>, path: &str) -> io::Result<()> {
        let delim = self.page_url(out, "plain", Some(path))?;
        self.head_arg(out, delim)?;
        Ok(())
    }

    /// Link to the repository a submodule entry points at.
    ///
    /// A per-path URL from `[repo.submodules]` wins over the `module_link`
    /// pattern. With neither, the path is shown without a link. `{path}` in
    /// a pattern is replaced by the last path component, `{id}` by the
    /// full commit id.
    pub fn submodule_link<W: Write>(
        &self,
        out: &mut Html<W>,
        class: Option<&str>,
        path: &str,
        id: &ObjectId,
    ) -> io::Result<()> {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        let url = match self
            .repo
            .submodules
            .get(path)
            .or_else(|| self.repo.submodules.get(trimmed))
        {
            Some(url) => Some(expand_module_pattern(url, trimmed, id)),
            None => self.repo.module_link.as_deref().map(|pattern| {
                let dir = trimmed.rsplit('/').next().unwrap_or(trimmed);
                expand_module_pattern(pattern, dir, id)
            }),
        };

        match url {
            Some(url) => {
                out.html("<a ")?;
                if let Some(class) = class {
                    out.html("class='")?;
                    out.attr(class)?;
                    out.html("' ")?;
                }
                out.html("href='")?;
                out.attr(&url)?;
                out.html("'>")?;
                out.text(path)?;
                out.html("</a>")?;
            }
            None => {
                out.html("<span")?;
                if let Some(class) = class {
                    out.html(" class='")?;
                    out.attr(class)?;
                    out.html("'")?;
                }
                out.html(">")?;
                out.text(path)?;
                out.html("</span>")?;
            }
        }
        out.text(" @ ")?;
        out.text(&id.short_hex())
    }
}

fn expand_module_pattern(pattern: &str, path: &str, id: &ObjectId) -> String {
    pattern.replace("{path}", path).replace("{id}", &id.to_hex())
}
