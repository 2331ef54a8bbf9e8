//! The record procedure: dedupe, emit a stanza on first sighting, tag.

use std::ffi::CStr;
use std::io::{self, Write};

use libc::c_char;

use wgettext_config::{log_po_debug, log_po_trace, log_sink_warn};

use crate::context::split_context;
use crate::po::{self, MSGCTXT, MSGID, MSGID_PLURAL, MSGSTR, MSGSTR_PLURAL};
use crate::registry::MessageRegistry;
use crate::stack::StackSource;

/// Reported when neither the caller nor `textdomain(NULL)` names a domain.
pub const DEFAULT_DOMAIN: &[u8] = b"messages";

/// One intercepted lookup, as seen by the interposer.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    /// Name of the intercepted function, e.g. `dcgettext`.
    pub func: &'static str,
    /// Domain passed by the caller; `None` for a null domain.
    pub domain: Option<&'a [u8]>,
    /// Message as passed, context prefix included.
    pub msgid: &'a [u8],
    pub msgid_plural: Option<&'a [u8]>,
    /// What the real library returned.
    pub translated: &'a [u8],
    /// Address of the caller's msgid, used as the `#:` "line number".
    pub handle: usize,
}

/// Bytes of a nullable C string argument.
unsafe fn opt_bytes<'a>(p: *const c_char) -> Option<&'a [u8]> {
    if p.is_null() {
        None
    } else {
        Some(CStr::from_ptr(p).to_bytes())
    }
}

impl<'a> Lookup<'a> {
    /// Build a lookup from the raw arguments of an intercepted call and the
    /// real library's result. `None` for a null `msgid` or a null result:
    /// those are handed back untouched and never recorded.
    ///
    /// # Safety
    ///
    /// Every non-null pointer must be a NUL-terminated string that outlives
    /// `'a`.
    pub unsafe fn from_raw(
        func: &'static str,
        domain: *const c_char,
        msgid: *const c_char,
        msgid_plural: *const c_char,
        translated: *const c_char,
    ) -> Option<Self> {
        Some(Self {
            func,
            domain: opt_bytes(domain),
            msgid: opt_bytes(msgid)?,
            msgid_plural: opt_bytes(msgid_plural),
            translated: opt_bytes(translated)?,
            handle: msgid as usize,
        })
    }
}

/// Outcome of [`Recorder::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded<'a> {
    pub refno: u32,
    /// A stanza was emitted for this call.
    pub inserted: bool,
    /// The translation with any context prefix removed.
    pub translated: &'a [u8],
}

impl Recorded<'_> {
    /// `[<ref>]<translation>`, the string handed back to the host.
    pub fn tagged(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.translated.len() + 12);
        out.push(b'[');
        out.extend_from_slice(self.refno.to_string().as_bytes());
        out.push(b']');
        out.extend_from_slice(self.translated);
        out
    }
}

pub struct Recorder<W: Write, S: StackSource> {
    registry: MessageRegistry,
    out: W,
    stack: S,
    default_domain: fn() -> Option<Vec<u8>>,
    calls: u64,
    write_failures: u64,
}

fn no_default_domain() -> Option<Vec<u8>> {
    None
}

impl<W: Write, S: StackSource> Recorder<W, S> {
    pub fn new(out: W, stack: S) -> Self {
        Self {
            registry: MessageRegistry::new(),
            out,
            stack,
            default_domain: no_default_domain,
            calls: 0,
            write_failures: 0,
        }
    }

    /// Resolver for the domain reported when a lookup carries none. Only
    /// consulted when a stanza is written.
    pub fn with_default_domain(mut self, resolve: fn() -> Option<Vec<u8>>) -> Self {
        self.default_domain = resolve;
        self
    }

    /// Assign or fetch the reference for `lookup.msgid` and, on first
    /// sighting, write its stanza. Write failures are logged and swallowed:
    /// the caller gets its tag either way.
    pub fn record<'a>(&mut self, lookup: &Lookup<'a>) -> Recorded<'a> {
        self.calls += 1;
        let (translated, _) = split_context(lookup.translated);
        let (refno, inserted) = self.registry.lookup_or_insert(lookup.msgid);

        if inserted {
            log_po_debug!(
                "New message",
                refno = refno,
                func = lookup.func,
                msgid = tracing::field::display(String::from_utf8_lossy(lookup.msgid))
            );
            if let Err(err) = self.write_stanza(refno, lookup, translated) {
                self.write_failures += 1;
                log_sink_warn!(
                    "Failed to write stanza",
                    refno = refno,
                    error = tracing::field::display(&err)
                );
            }
        } else {
            log_po_trace!("Repeat message", refno = refno, func = lookup.func);
        }

        Recorded {
            refno,
            inserted,
            translated,
        }
    }

    fn write_stanza(
        &mut self,
        refno: u32,
        lookup: &Lookup<'_>,
        translated: &[u8],
    ) -> io::Result<()> {
        let (msgid, ctxt) = split_context(lookup.msgid);

        // Build the whole stanza first so a failing write never leaves half
        // of it in the file.
        let mut buf = Vec::with_capacity(256);
        buf.push(b'\n');
        writeln!(buf, "#. [{}] {}()", refno, lookup.func)?;

        let fallback;
        let domain = match lookup.domain {
            Some(d) => d,
            None => {
                fallback = (self.default_domain)();
                fallback.as_deref().unwrap_or(DEFAULT_DOMAIN)
            }
        };
        buf.extend_from_slice(b"#: ");
        buf.extend_from_slice(domain);
        writeln!(buf, ":{:#x}", lookup.handle)?;

        for frame in self.stack.frames() {
            writeln!(buf, "# {}", frame)?;
        }

        if let Some(ctxt) = ctxt {
            po::write_single_line(&mut buf, MSGCTXT, ctxt)?;
        }
        po::write_message(&mut buf, MSGID, msgid)?;
        match lookup.msgid_plural {
            Some(plural) => {
                po::write_message(&mut buf, MSGID_PLURAL, plural)?;
                po::write_message(&mut buf, MSGSTR_PLURAL, translated)?;
            }
            None => po::write_message(&mut buf, MSGSTR, translated)?,
        }

        self.out.write_all(&buf)?;
        self.out.flush()
    }

    /// Distinct messages seen so far.
    pub fn messages(&self) -> usize {
        self.registry.len()
    }

    /// Lookups recorded so far, repeats included.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_writer(self) -> W {
        self.out
    }
}
