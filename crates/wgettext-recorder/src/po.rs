//! PO string emission.
//!
//! A message is written as a keyword followed by one or more quoted lines.
//! Source newlines end a quoted line, the way `xgettext` lays out multi-line
//! messages:
//!
//! ```text
//! msgid ""
//! "Line1\n"
//! "Line2"
//! ```
//!
//! Bytes other than the escaped set are copied through untouched; the shim
//! never transcodes.

use std::io::{self, Write};

pub const MSGCTXT: &str = "msgctxt";
pub const MSGID: &str = "msgid";
pub const MSGID_PLURAL: &str = "msgid_plural";
pub const MSGSTR: &str = "msgstr";
/// Only one plural translation is observed per lookup, so its index is unknown.
pub const MSGSTR_PLURAL: &str = "msgstr[FIXME]";

fn escape_for(b: u8) -> Option<&'static [u8]> {
    match b {
        b'\t' => Some(b"\\t"),
        b'\r' => Some(b"\\r"),
        b'\x0c' => Some(b"\\f"),
        b'\n' => Some(b"\\n"),
        b'\\' => Some(b"\\\\"),
        b'"' => Some(b"\\\""),
        _ => None,
    }
}

/// Transient state for one keyword emission.
struct QuotedLines<'w, W: Write> {
    out: &'w mut W,
    /// A `"` has been written and not yet closed.
    open: bool,
    /// Number of quoted lines started so far.
    lines: usize,
    split_lines: bool,
}

impl<'w, W: Write> QuotedLines<'w, W> {
    fn new(out: &'w mut W, split_lines: bool) -> Self {
        Self {
            out,
            open: false,
            lines: 0,
            split_lines,
        }
    }

    fn ensure_open(&mut self) -> io::Result<()> {
        if !self.open {
            self.out.write_all(b"\"")?;
            self.open = true;
            self.lines += 1;
        }
        Ok(())
    }

    fn literal(&mut self, run: &[u8]) -> io::Result<()> {
        if run.is_empty() {
            return Ok(());
        }
        self.ensure_open()?;
        self.out.write_all(run)
    }

    fn escape(&mut self, seq: &[u8]) -> io::Result<()> {
        self.ensure_open()?;
        self.out.write_all(seq)
    }

    fn close(&mut self) -> io::Result<()> {
        if self.open {
            self.out.write_all(b"\"\n")?;
            self.open = false;
        }
        Ok(())
    }

    fn emit(&mut self, s: &[u8]) -> io::Result<()> {
        let mut pending = 0;
        for (i, &b) in s.iter().enumerate() {
            let Some(seq) = escape_for(b) else {
                continue;
            };
            self.literal(&s[pending..i])?;
            self.escape(seq)?;
            pending = i + 1;
            if b == b'\n' && self.split_lines {
                self.close()?;
            }
        }
        self.literal(&s[pending..])?;

        // An empty message still needs its `""`.
        if self.lines == 0 {
            self.ensure_open()?;
        }
        self.close()
    }
}

/// Write `keyword` and the quoted, escaped form of `s`.
///
/// Strings containing a newline get an empty `""` header line and one quoted
/// line per source line; everything else fits on the keyword line.
pub fn write_message<W: Write>(out: &mut W, keyword: &str, s: &[u8]) -> io::Result<()> {
    if s.contains(&b'\n') {
        writeln!(out, "{} \"\"", keyword)?;
    } else {
        write!(out, "{} ", keyword)?;
    }
    QuotedLines::new(out, true).emit(s)
}

/// Write `keyword` and `s` on a single quoted line, escaping but never
/// splitting. Used for `msgctxt`.
pub fn write_single_line<W: Write>(out: &mut W, keyword: &str, s: &[u8]) -> io::Result<()> {
    write!(out, "{} ", keyword)?;
    QuotedLines::new(out, false).emit(s)
}

/// Undo PO escaping of the text between the quotes of one line.
pub fn unescape(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut iter = s.iter().copied();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match iter.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(b'r') => out.push(b'\r'),
            Some(b'f') => out.push(b'\x0c'),
            Some(b'a') => out.push(b'\x07'),
            Some(b'b') => out.push(b'\x08'),
            Some(b'v') => out.push(b'\x0b'),
            Some(b'\\') => out.push(b'\\'),
            Some(b'"') => out.push(b'"'),
            Some(other) => {
                out.push(b'\\');
                out.push(other);
            }
            None => out.push(b'\\'),
        }
    }
    out
}
