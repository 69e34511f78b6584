//! The output dialect shared by every writer downstream: pipe-delimited,
//! LF-terminated, quoting only a field that actually needs it (contains the
//! delimiter, a quote, or a newline — sanitization has already removed the
//! pipe and raw newlines from field content, so this is mostly inert).

use std::io::Write;

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

pub fn new_writer<W: Write>(inner: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b'|')
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(inner)
}
