//! HTML output sink
//!
//! Every renderer receives an explicit `&mut Html<W>` handle. Escaping happens
//! while writing, in runs: unescaped spans are written as-is and only the
//! special bytes are replaced.

use std::fmt;
use std::io::{self, Write};

/// Output sink with HTML escaping primitives.
pub struct Html<W: Write> {
    out: W,
}

impl<W: Write> Html<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write bytes verbatim.
    pub fn raw(&mut self, data: &[u8]) -> io::Result<()> {
        self.out.write_all(data)
    }

    /// Write trusted markup verbatim.
    pub fn html(&mut self, markup: &str) -> io::Result<()> {
        self.out.write_all(markup.as_bytes())
    }

    /// Formatted trusted markup, e.g. `out.fmt(format_args!("{:04x}", ofs))`.
    pub fn fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(args)
    }

    /// Text content: escapes `<`, `>` and `&`.
    pub fn text(&mut self, txt: &str) -> io::Result<()> {
        self.text_bytes(txt.as_bytes())
    }

    pub fn text_bytes(&mut self, txt: &[u8]) -> io::Result<()> {
        write_escaped(&mut self.out, txt, text_entity)
    }

    /// Attribute values: escapes `<`, `>`, `'`, `"` and `&`.
    pub fn attr(&mut self, txt: &str) -> io::Result<()> {
        write_escaped(&mut self.out, txt.as_bytes(), attr_entity)
    }

    /// Percent-encode a URL path component.
    pub fn url_path(&mut self, txt: &str) -> io::Result<()> {
        write_url(&mut self.out, txt.as_bytes(), UrlMode::Path)
    }

    /// Percent-encode a query argument (space becomes `+`).
    pub fn url_arg(&mut self, txt: &str) -> io::Result<()> {
        write_url(&mut self.out, txt.as_bytes(), UrlMode::Arg)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn text_entity(c: u8) -> Option<&'static str> {
    match c {
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'&' => Some("&amp;"),
        _ => None,
    }
}

fn attr_entity(c: u8) -> Option<&'static str> {
    match c {
        b'\'' => Some("&#x27;"),
        b'"' => Some("&quot;"),
        _ => text_entity(c),
    }
}

fn write_escaped<W: Write>(
    out: &mut W,
    data: &[u8],
    entity: fn(u8) -> Option<&'static str>,
) -> io::Result<()> {
    let mut start = 0;
    for (idx, &c) in data.iter().enumerate() {
        if let Some(replacement) = entity(c) {
            out.write_all(&data[start..idx])?;
            out.write_all(replacement.as_bytes())?;
            start = idx + 1;
        }
    }
    out.write_all(&data[start..])
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum UrlMode {
    Path,
    Arg,
}

/// Bytes passed through without percent-encoding in either mode.
fn is_url_safe(c: u8) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            b'!' | b'$'
                | b'('
                | b')'
                | b'*'
                | b','
                | b'-'
                | b'.'
                | b'/'
                | b':'
                | b';'
                | b'@'
                | b'['
                | b']'
                | b'_'
                | b'~'
        )
}

fn write_url<W: Write>(out: &mut W, data: &[u8], mode: UrlMode) -> io::Result<()> {
    let mut start = 0;
    for (idx, &c) in data.iter().enumerate() {
        let keep = match mode {
            // Paths keep `+` and `&` literal; they are only special in queries.
            UrlMode::Path => is_url_safe(c) || c == b'+' || c == b'&',
            UrlMode::Arg => is_url_safe(c),
        };
        if keep {
            continue;
        }
        out.write_all(&data[start..idx])?;
        if mode == UrlMode::Arg && c == b' ' {
            out.write_all(b"+")?;
        } else {
            write!(out, "%{:02x}", c)?;
        }
        start = idx + 1;
    }
    out.write_all(&data[start..])
}

fn escape_with(data: &[u8], f: impl FnOnce(&mut Vec<u8>, &[u8]) -> io::Result<()>) -> String {
    let mut buf = Vec::with_capacity(data.len());
    // Writing into a Vec cannot fail.
    let _ = f(&mut buf, data);
    String::from_utf8_lossy(&buf).into_owned()
}

/// `Html::text` into a fresh string.
pub fn escape_text(txt: &str) -> String {
    escape_with(txt.as_bytes(), |out, data| write_escaped(out, data, text_entity))
}

/// `Html::attr` into a fresh string.
pub fn escape_attr(txt: &str) -> String {
    escape_with(txt.as_bytes(), |out, data| write_escaped(out, data, attr_entity))
}

/// `Html::url_path` into a fresh string.
pub fn encode_url_path(txt: &str) -> String {
    escape_with(txt.as_bytes(), |out, data| write_url(out, data, UrlMode::Path))
}

/// `Html::url_arg` into a fresh string.
pub fn encode_url_arg(txt: &str) -> String {
    escape_with(txt.as_bytes(), |out, data| write_url(out, data, UrlMode::Arg))
}
