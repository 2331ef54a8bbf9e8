//! Test helpers: a deterministic stack source and a reader for the stanzas
//! this crate writes.
//!
//! # Usage
//!
//! ```ignore
//! use wgettext_recorder::testing::{parse_stanzas, FixedStack};
//!
//! let mut rec = Recorder::new(Vec::new(), FixedStack::default());
//! rec.record(&lookup);
//! let stanzas = parse_stanzas(rec.writer());
//! assert_eq!(stanzas[0].msgid, b"Hello");
//! ```

use crate::po::unescape;
use crate::stack::StackSource;

/// Stack source returning the same frames every time.
#[derive(Debug, Clone, Default)]
pub struct FixedStack(Vec<String>);

impl FixedStack {
    pub fn new<I, T>(frames: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self(frames.into_iter().map(Into::into).collect())
    }
}

impl StackSource for FixedStack {
    fn frames(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// One parsed stanza. Strings are unescaped and concatenated across lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stanza {
    pub refno: u32,
    pub func: String,
    /// Text after `#: `.
    pub reference: Vec<u8>,
    /// Text after `# ` on frame lines.
    pub frames: Vec<String>,
    pub msgctxt: Option<Vec<u8>>,
    pub msgid: Vec<u8>,
    pub msgid_plural: Option<Vec<u8>>,
    /// Keyword used for the translation line (`msgstr` or `msgstr[FIXME]`).
    pub msgstr_keyword: String,
    pub msgstr: Vec<u8>,
}

#[derive(Clone, Copy)]
enum Field {
    Ctxt,
    Id,
    Plural,
    Str,
}

fn quoted(line: &[u8]) -> Option<&[u8]> {
    let start = line.iter().position(|&b| b == b'"')?;
    let rest = &line[start + 1..];
    rest.strip_suffix(b"\"")
}

fn append(stanza: &mut Stanza, field: Field, value: &[u8]) {
    let value = unescape(value);
    match field {
        Field::Ctxt => stanza.msgctxt.get_or_insert_with(Vec::new).extend(value),
        Field::Id => stanza.msgid.extend(value),
        Field::Plural => stanza.msgid_plural.get_or_insert_with(Vec::new).extend(value),
        Field::Str => stanza.msgstr.extend(value),
    }
}

/// Parse every stanza following the header comment block.
///
/// Unrecognized lines are skipped.
pub fn parse_stanzas(text: &[u8]) -> Vec<Stanza> {
    let mut stanzas = Vec::new();
    let mut current: Option<Stanza> = None;
    let mut field = Field::Id;

    for line in text.split(|&b| b == b'\n') {
        if let Some(rest) = line.strip_prefix(b"#. [") {
            if let Some(done) = current.take() {
                stanzas.push(done);
            }
            let text = String::from_utf8_lossy(rest);
            let (refno, func) = text.split_once("] ").unwrap_or((text.as_ref(), ""));
            current = Some(Stanza {
                refno: refno.parse().unwrap_or(0),
                func: func.trim_end_matches("()").to_string(),
                ..Stanza::default()
            });
            continue;
        }
        let Some(stanza) = current.as_mut() else {
            continue;
        };

        if let Some(rest) = line.strip_prefix(b"#: ") {
            stanza.reference = rest.to_vec();
        } else if let Some(rest) = line.strip_prefix(b"# ") {
            stanza.frames.push(String::from_utf8_lossy(rest).into_owned());
        } else if line.starts_with(b"\"") {
            if let Some(value) = quoted(line) {
                append(stanza, field, value);
            }
        } else if let Some(split) = line.iter().position(|&b| b == b' ') {
            let keyword = &line[..split];
            field = match keyword {
                b"msgctxt" => Field::Ctxt,
                b"msgid" => Field::Id,
                b"msgid_plural" => Field::Plural,
                k if k.starts_with(b"msgstr") => {
                    stanza.msgstr_keyword = String::from_utf8_lossy(k).into_owned();
                    Field::Str
                }
                _ => continue,
            };
            if let Some(value) = quoted(&line[split..]) {
                append(stanza, field, value);
            }
        }
    }

    if let Some(done) = current {
        stanzas.push(done);
    }
    stanzas
}
