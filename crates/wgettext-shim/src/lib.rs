//! # watch-gettext
//!
//! LD_PRELOAD / DYLD_INSERT_LIBRARIES shim that records every distinct
//! message an application looks up through `dcgettext`/`dcngettext`.
//!
//! Each returned translation is prefixed with `[<ref>]`, and the first
//! sighting of a message writes a stanza (call site, context, msgid,
//! translation) to `watch-gettext-<prog>.po`, so a string on screen can be
//! traced back to its source message.
//!
//! ```bash
//! WATCH_GETTEXT_DIR=/tmp LD_PRELOAD=target/release/libwatch_gettext.so gedit
//! ```
//!
//! Every returned string is a fresh allocation that is never freed, matching
//! gettext's rule that callers never free lookup results. That is one small
//! leak per intercepted call.

// Allow unsafe FFI functions without safety docs - these are inherently unsafe C ABI
#![allow(clippy::missing_safety_doc)]

pub mod error;
pub mod interpose;
pub mod reals;
mod state;

pub use error::ShimError;

/// Load hook for Linux (.init_array): open the output file and write its header.
#[cfg(target_os = "linux")]
#[link_section = ".init_array"]
#[used]
pub static WATCH_GETTEXT_INIT: unsafe extern "C" fn() = {
    unsafe extern "C" fn init() {
        crate::state::load();
    }
    init
};

/// Unload hook for Linux (.fini_array): flush and close the output file.
#[cfg(target_os = "linux")]
#[link_section = ".fini_array"]
#[used]
pub static WATCH_GETTEXT_FINI: unsafe extern "C" fn() = {
    unsafe extern "C" fn fini() {
        crate::state::unload();
    }
    fini
};

#[cfg(target_os = "macos")]
#[link_section = "__DATA,__mod_init_func"]
#[used]
pub static WATCH_GETTEXT_INIT: unsafe extern "C" fn() = {
    unsafe extern "C" fn init() {
        crate::state::load();
    }
    init
};

#[cfg(target_os = "macos")]
#[link_section = "__DATA,__mod_term_func"]
#[used]
pub static WATCH_GETTEXT_FINI: unsafe extern "C" fn() = {
    unsafe extern "C" fn fini() {
        crate::state::unload();
    }
    fini
};
