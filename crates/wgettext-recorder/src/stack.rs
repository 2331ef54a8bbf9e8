//! Call-site capture for stanzas.
//!
//! Frames above the interposer entry point only describe the shim itself, so
//! they are dropped. The entry point is found by symbol name when symbols are
//! available; otherwise a fixed number of top frames is skipped.

use std::ffi::c_void;
use std::fmt::Write as _;

/// Upper bound on frames walked while looking for the anchor.
const MAX_WALK: usize = 128;

/// Source of textual stack frames for a stanza.
pub trait StackSource {
    /// Frames of the current call stack, outermost shim frames removed,
    /// innermost first.
    fn frames(&self) -> Vec<String>;
}

/// Captures the live call stack with the `backtrace` crate.
#[derive(Debug, Clone)]
pub struct Backtracer {
    depth: usize,
    skip: usize,
    anchors: &'static [&'static str],
}

impl Backtracer {
    pub fn new(depth: usize, skip: usize) -> Self {
        Self {
            depth,
            skip,
            anchors: &[],
        }
    }

    /// Symbol names of the interposer entry points. The first printed frame
    /// is the one right below the innermost frame carrying one of these names.
    pub fn with_anchors(mut self, anchors: &'static [&'static str]) -> Self {
        self.anchors = anchors;
        self
    }

    fn is_anchor(&self, name: &str) -> bool {
        self.anchors.iter().any(|a| *a == name)
    }
}

struct Resolved {
    ip: *mut c_void,
    name: Option<String>,
    offset: Option<usize>,
    location: Option<(String, u32)>,
}

fn resolve(frame: &::backtrace::Frame) -> Resolved {
    let ip = frame.ip();
    // Symbol tables give link-time addresses; the unwinder's function start
    // is a runtime address, in the same space as `ip`.
    let start = frame.symbol_address();
    let mut resolved = Resolved {
        ip,
        name: None,
        offset: (!start.is_null()).then(|| (ip as usize).wrapping_sub(start as usize)),
        location: None,
    };
    ::backtrace::resolve_frame(frame, |symbol| {
        // Inlined frames resolve to several symbols; the first is enough.
        if resolved.name.is_some() {
            return;
        }
        // `{:#}` drops the trailing `::h<hash>` of Rust symbols.
        resolved.name = symbol.name().map(|n| format!("{:#}", n));
        if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
            resolved.location = Some((file.display().to_string(), line));
        }
    });
    resolved
}

/// `<symbol>+0x<offset> [<ip>]`, with ` at <file>:<line>` when known.
fn format_frame(frame: &Resolved) -> String {
    let mut text = String::new();
    match (&frame.name, frame.offset) {
        (Some(name), Some(offset)) => {
            let _ = write!(text, "{}+{:#x}", name, offset);
        }
        (Some(name), None) => text.push_str(name),
        (None, _) => text.push_str("??"),
    }
    let _ = write!(text, " [{:p}]", frame.ip);
    if let Some((file, line)) = &frame.location {
        let _ = write!(text, " at {}:{}", file, line);
    }
    text
}

impl Backtracer {
    /// Resolved frames below the anchor, at most `depth` of them.
    fn capture(&self) -> Vec<Resolved> {
        let mut raw = Vec::new();
        ::backtrace::trace(|frame| {
            raw.push(frame.clone());
            raw.len() < MAX_WALK
        });

        let resolved: Vec<Resolved> = raw.iter().map(resolve).collect();
        let start = resolved
            .iter()
            .position(|f| f.name.as_deref().is_some_and(|n| self.is_anchor(n)))
            .map(|anchor| anchor + 1)
            .unwrap_or(self.skip);

        resolved.into_iter().skip(start).take(self.depth).collect()
    }
}

impl StackSource for Backtracer {
    fn frames(&self) -> Vec<String> {
        self.capture().iter().map(format_frame).collect()
    }
}
