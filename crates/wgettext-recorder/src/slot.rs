// =============================================================================
// slot.rs: process-wide recorder and recursion guard
// =============================================================================
//
// One mutex covers both the registry and the output file, so stanzas from
// different threads never interleave. The interposed ABI has no room for a
// handle, so the shim keeps one `RecorderSlot` in a static.
//
// Re-entry: anything the record path calls could in principle translate a
// message through dcgettext (libc error strings, a host-installed tracing
// layer). ReentryGuard turns such nested calls into plain pass-through instead
// of deadlocking on the slot.
// =============================================================================

use std::cell::Cell;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use wgettext_config::log_shim_debug;

use crate::recorder::{Lookup, Recorder};
use crate::stack::StackSource;

thread_local! {
    static IN_SHIM: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside the shim for its lifetime.
pub struct ReentryGuard(());

impl ReentryGuard {
    /// `None` if this thread is already inside the shim, or its thread-locals
    /// are gone (thread teardown). Callers pass through in both cases.
    pub fn enter() -> Option<Self> {
        IN_SHIM
            .try_with(|flag| {
                if flag.replace(true) {
                    None
                } else {
                    Some(ReentryGuard(()))
                }
            })
            .ok()
            .flatten()
    }
}

impl Drop for ReentryGuard {
    fn drop(&mut self) {
        let _ = IN_SHIM.try_with(|flag| flag.set(false));
    }
}

/// The recorder calls are routed to, once installed.
pub struct RecorderSlot<W: Write, S: StackSource> {
    inner: Mutex<Option<Recorder<W, S>>>,
}

impl<W: Write, S: StackSource> RecorderSlot<W, S> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// A poisoned lock is still usable: the recorder never leaves the
    /// registry half-updated.
    fn lock(&self) -> MutexGuard<'_, Option<Recorder<W, S>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn install(&self, recorder: Recorder<W, S>) {
        *self.lock() = Some(recorder);
    }

    pub fn take(&self) -> Option<Recorder<W, S>> {
        self.lock().take()
    }

    /// Record `lookup` and return the tagged translation.
    ///
    /// `None` means the caller must hand back the untouched translation:
    /// nothing is installed (before load, after unload), or this thread is
    /// already inside the shim.
    pub fn tag(&self, lookup: &Lookup<'_>) -> Option<Vec<u8>> {
        let Some(_guard) = ReentryGuard::enter() else {
            log_shim_debug!("Nested lookup passed through", func = lookup.func);
            return None;
        };
        let mut slot = self.lock();
        let recorder = slot.as_mut()?;
        Some(recorder.record(lookup).tagged())
    }
}

impl<W: Write, S: StackSource> Default for RecorderSlot<W, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{parse_stanzas, FixedStack};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lookup<'a>(msgid: &'a [u8], translated: &'a [u8]) -> Lookup<'a> {
        Lookup {
            func: "dcgettext",
            domain: Some(b"app"),
            msgid,
            msgid_plural: None,
            translated,
            handle: 0x10,
        }
    }

    fn recorder() -> Recorder<Vec<u8>, FixedStack> {
        Recorder::new(Vec::new(), FixedStack::new(["main+0x1 [0x1]"]))
    }

    #[test]
    fn test_tags_once_installed() {
        let slot = RecorderSlot::new();
        slot.install(recorder());
        assert_eq!(slot.tag(&lookup(b"Hello", b"Bonjour")).unwrap(), b"[1]Bonjour");
        assert_eq!(slot.tag(&lookup(b"Hello", b"Bonjour")).unwrap(), b"[1]Bonjour");
    }

    #[test]
    fn test_before_install_passes_through() {
        let slot: RecorderSlot<Vec<u8>, FixedStack> = RecorderSlot::new();
        assert_eq!(slot.tag(&lookup(b"Hello", b"Bonjour")), None);
    }

    #[test]
    fn test_after_take_passes_through() {
        let slot = RecorderSlot::new();
        slot.install(recorder());
        slot.tag(&lookup(b"Hello", b"Bonjour"));

        let rec = slot.take().unwrap();
        assert_eq!(rec.messages(), 1);
        assert_eq!(slot.tag(&lookup(b"Bye", b"Salut")), None);
        assert_eq!(parse_stanzas(rec.writer()).len(), 1);
    }

    #[test]
    fn test_guard_blocks_same_thread_only() {
        let outer = ReentryGuard::enter().unwrap();
        assert!(ReentryGuard::enter().is_none());
        std::thread::spawn(|| assert!(ReentryGuard::enter().is_some()))
            .join()
            .unwrap();
        drop(outer);
        assert!(ReentryGuard::enter().is_some());
    }

    #[test]
    fn test_held_guard_passes_through() {
        let slot = RecorderSlot::new();
        slot.install(recorder());
        {
            let _guard = ReentryGuard::enter().unwrap();
            assert_eq!(slot.tag(&lookup(b"Hello", b"Bonjour")), None);
        }
        assert_eq!(slot.tag(&lookup(b"Hello", b"Bonjour")).unwrap(), b"[1]Bonjour");
    }

    /// Stack source that translates a message while the stanza is built,
    /// as a host-installed hook inside the record path would.
    struct TranslatingStack;

    static NESTED: RecorderSlot<Vec<u8>, TranslatingStack> = RecorderSlot::new();
    static NESTED_TAGGED: AtomicUsize = AtomicUsize::new(0);

    impl StackSource for TranslatingStack {
        fn frames(&self) -> Vec<String> {
            if NESTED.tag(&lookup(b"inner", b"innen")).is_some() {
                NESTED_TAGGED.fetch_add(1, Ordering::SeqCst);
            }
            vec!["hook+0x1 [0x1]".to_string()]
        }
    }

    #[test]
    fn test_nested_call_does_not_deadlock() {
        NESTED.install(Recorder::new(Vec::new(), TranslatingStack));
        assert_eq!(NESTED.tag(&lookup(b"outer", b"aussen")).unwrap(), b"[1]aussen");
        assert_eq!(NESTED_TAGGED.load(Ordering::SeqCst), 0);

        let rec = NESTED.take().unwrap();
        assert_eq!(rec.messages(), 1);
        let stanzas = parse_stanzas(rec.writer());
        assert_eq!(stanzas.len(), 1);
        assert_eq!(stanzas[0].msgid, b"outer");
    }
}
