/// Separator gettext places between a message context and the message.
pub const CONTEXT_SEPARATOR: u8 = 0x04;

/// Split `"<ctxt>\x04<msg>"` into `(msg, Some(ctxt))`.
///
/// Only the first separator counts. Strings without one come back unchanged
/// with no context.
pub fn split_context(s: &[u8]) -> (&[u8], Option<&[u8]>) {
    match s.iter().position(|&b| b == CONTEXT_SEPARATOR) {
        Some(pos) => (&s[pos + 1..], Some(&s[..pos])),
        None => (s, None),
    }
}
