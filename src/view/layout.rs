//! Page metadata and the content wrapper

use crate::error::ViewError;
use crate::html::Html;
use std::io::{self, Write};
use tracing::{debug, error};

/// Metadata for the page being rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub status: u16,
    pub reason: &'static str,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: 200,
            reason: "OK",
        }
    }

    /// Prefix the title with the path, last component first:
    /// `a/b/c` turns `repo` into `c\b\a - repo`.
    pub fn set_title_from_path(&mut self, path: &str) {
        let reversed: Vec<&str> = path.rsplit('/').collect();
        self.title = format!("{} - {}", reversed.join("\\"), self.title);
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

pub fn start<W: Write>(out: &mut Html<W>) -> io::Result<()> {
    out.html("<div class='content'>")
}

pub fn end<W: Write>(out: &mut Html<W>) -> io::Result<()> {
    out.html("</div> <!-- class=content -->\n")
}

/// Record the error status on the page and render the message inside the
/// layout.
pub fn print_error_page<W: Write>(
    out: &mut Html<W>,
    page: &mut Page,
    err: &ViewError,
) -> io::Result<()> {
    page.status = err.status();
    page.reason = err.reason();
    start(out)?;
    out.html("<div class='error'>")?;
    out.text(&err.to_string())?;
    out.html("</div>\n")?;
    end(out)
}

/// Pass a successful render through, or turn its error into an error page.
///
/// Returns `None` when an error page was written; `page` then carries the
/// status. Only failures of the output itself are returned as errors.
pub fn page_or_error<W: Write, T>(
    out: &mut Html<W>,
    page: &mut Page,
    result: Result<T, ViewError>,
) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ViewError::Output(e)) => Err(e),
        Err(err) => {
            if err.status() >= 500 {
                error!(error = %err, "View failed");
            } else {
                debug!(error = %err, "View not found");
            }
            print_error_page(out, page, &err)?;
            Ok(None)
        }
    }
}
