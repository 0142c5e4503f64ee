//! Blob rendering
//!
//! A blob is shown one of four ways: through its render filter, embedded
//! by mimetype (image or sandboxed frame), as a hex dump, or as text with
//! optional line numbers and source filter.

use crate::error::{StoreError, ViewError};
use crate::filter::Filter;
use crate::html::Html;
use crate::store::ObjectStore;
use crate::types::{ObjectId, ObjectKind};
use crate::view::layout::{self, Page};
use crate::view::RenderContext;
use std::io::{self, Write};
use tracing::{debug, instrument};

/// Bytes per hex dump row.
pub const ROW_LEN: usize = 32;

/// Number of line-number anchors for a text buffer: one for the first line
/// plus one per newline, ignoring a newline in the final byte.
pub fn line_count(buf: &[u8]) -> usize {
    match buf.split_last() {
        None => 0,
        Some((_, init)) => 1 + init.iter().filter(|&&b| b == b'\n').count(),
    }
}

/// Text up to the first NUL. Classification only inspects a prefix, so a
/// later NUL can still reach the text path.
fn until_nul(buf: &[u8]) -> &[u8] {
    match buf.iter().position(|&b| b == 0) {
        Some(end) => &buf[..end],
        None => buf,
    }
}

pub fn print_text_buffer<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    basename: &str,
    buf: &[u8],
) -> Result<(), ViewError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    out.html("<table summary='blob content' class='blob'>\n")?;

    if ctx.site.enable_tree_linenumbers {
        out.html("<tr><td class='linenumbers'><pre>")?;
        for lineno in 1..=line_count(buf) {
            out.fmt(format_args!(
                "<a id='n{0}' href='#n{0}'>{0}</a>\n",
                lineno
            ))?;
        }
        out.html("</pre></td>\n")?;
    } else {
        out.html("<tr>\n")?;
    }

    out.html("<td class='lines'><pre><code>")?;
    match &ctx.repo.source_filter {
        Some(name) => {
            let highlighted = ctx.filters.apply(name, basename, buf)?;
            out.raw(&highlighted)?;
        }
        None => out.text_bytes(until_nul(buf))?,
    }
    out.html("</code></pre></td></tr></table>\n")?;
    Ok(())
}

pub fn print_binary_buffer<W: Write>(out: &mut Html<W>, buf: &[u8]) -> io::Result<()> {
    out.html("<table summary='blob content' class='bin-blob'>\n")?;
    out.html("<tr><th>ofs</th><th>hex dump</th><th>ascii</th></tr>")?;
    for (row, chunk) in buf.chunks(ROW_LEN).enumerate() {
        out.fmt(format_args!(
            "<tr><td class='right'>{:04x}</td><td class='hex'>",
            row * ROW_LEN
        ))?;
        for (idx, byte) in chunk.iter().enumerate() {
            let pad = if idx == 16 { "    " } else { " " };
            out.fmt(format_args!("{}{:02x}", pad, byte))?;
        }
        out.html(" </td><td class='hex'>")?;
        let ascii: Vec<u8> = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b } else { b'.' })
            .collect();
        out.text_bytes(&ascii)?;
        out.html("</td></tr>\n")?;
    }
    out.html("</table>\n")
}

/// Size notice, hex dump or text.
pub fn print_buffer<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    basename: &str,
    buf: &[u8],
) -> Result<(), ViewError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    let max_kb = ctx.site.max_blob_size;
    let size_kb = buf.len() as u64 / 1024;
    if max_kb > 0 && size_kb > max_kb {
        out.fmt(format_args!(
            "<div class='error'>blob size ({}KB) exceeds display size limit ({}KB).</div>",
            size_kb, max_kb
        ))?;
        return Ok(());
    }

    if ctx.classifier.is_binary(buf) {
        print_binary_buffer(out, buf)?;
    } else {
        print_text_buffer(ctx, out, basename, buf)?;
    }
    Ok(())
}

/// Filter output wrapped in a blob div. The filter runs to completion
/// before anything is written.
pub fn render_buffer<W: Write>(
    out: &mut Html<W>,
    render: &dyn Filter,
    basename: &str,
    buf: &[u8],
) -> Result<(), ViewError> {
    let rendered = render.apply(basename, buf)?;
    out.html("<div class='blob'>")?;
    out.raw(&rendered)?;
    out.html("</div>")?;
    Ok(())
}

/// Embed the raw file: `<img>` for images, a sandboxed frame otherwise.
pub fn include_file<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    path: &str,
    mimetype: &str,
) -> io::Result<()>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    out.html("<div class='blob'>")?;
    if mimetype.starts_with("image/") {
        out.html("<img alt='")?;
        out.attr(path)?;
        out.html("' src='")?;
    } else {
        out.html("<iframe sandbox='allow-scripts' src='")?;
    }
    ctx.links().plain_url(out, path)?;
    out.html("'></div>")
}

/// Render the blob `id` found at `path`.
///
/// Without a render filter or mimetype for the file, `use_render` is
/// ignored. `inline` omits the layout wrapper.
#[allow(clippy::too_many_arguments)]
#[instrument(skip(ctx, out, page, id), fields(id = %id.short_hex()))]
pub fn print_object<S, W>(
    ctx: &RenderContext<'_, S>,
    out: &mut Html<W>,
    page: &mut Page,
    id: &ObjectId,
    path: &str,
    basename: &str,
    rev: &str,
    use_render: bool,
    inline: bool,
) -> Result<(), ViewError>
where
    S: ObjectStore + ?Sized,
    W: Write,
{
    match ctx.store.object_info(id) {
        Ok(info) if info.kind == ObjectKind::Blob => {}
        Ok(_) | Err(StoreError::ObjectNotFound(_)) => {
            return Err(ViewError::NotFound(format!("Bad object name: {}", id)))
        }
        Err(e) => return Err(ViewError::Store(e)),
    }
    let buf = ctx
        .store
        .read_blob(id)
        .map_err(|_| ViewError::Internal(format!("Error reading object {}", id)))?;

    let render = ctx.render_filter_for(path);
    let mimetype = match render {
        Some(_) => None,
        None => ctx.mimetypes.lookup(path),
    };

    page.set_title_from_path(path);
    let use_render = use_render && (render.is_some() || mimetype.is_some());
    debug!(size = buf.len(), use_render, mimetype = ?mimetype, "Rendering blob");

    if !inline {
        layout::start(out)?;
    }

    let links = ctx.links();
    out.fmt(format_args!("blob: {} (", id))?;
    links.plain_link(out, "plain", None, Some(rev), Some(path))?;
    if ctx.site.enable_blame {
        out.html(") (")?;
        links.blame_link(out, "blame", None, Some(rev), Some(path))?;
    }
    if use_render {
        out.html(", ")?;
        links.source_link(out, "source", None, Some(rev), Some(path))?;
    } else if render.is_some() || mimetype.is_some() {
        out.html(", ")?;
        links.tree_link(out, "render", None, Some(rev), Some(path))?;
    }
    out.html(")\n")?;

    match (use_render, render, mimetype) {
        (true, Some(render), _) => render_buffer(out, render, basename, &buf)?,
        (true, None, Some(mimetype)) => include_file(ctx, out, path, mimetype)?,
        _ => print_buffer(ctx, out, basename, &buf)?,
    }

    if !inline {
        layout::end(out)?;
    }
    Ok(())
}
