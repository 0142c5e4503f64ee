//! Standalone HTML document around a rendered fragment.

use crate::html::Html;
use crate::view::Page;
use std::io::{self, Write};

/// Write a complete HTML5 document whose body is `body` (already markup).
pub fn write_document<W: Write>(out: &mut Html<W>, page: &Page, body: &[u8]) -> io::Result<()> {
    out.html("<!DOCTYPE html>\n<html lang='en'>\n<head>\n")?;
    out.html("<meta charset='utf-8'/>\n")?;
    out.html("<title>")?;
    out.text(&page.title)?;
    out.html("</title>\n</head>\n<body>\n")?;
    out.raw(body)?;
    out.html("</body>\n</html>\n")
}
