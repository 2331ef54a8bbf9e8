//! Exported replacements for `dcgettext` and `dcngettext`.
//! Safety: these are called by C code with C's pointer contract; arguments
//! are trusted to be NUL-terminated or null exactly as the real functions
//! would trust them.
#![allow(clippy::missing_safety_doc)]

use libc::{c_char, c_int, c_ulong};

use wgettext_recorder::Lookup;

use crate::reals::{leak_c_string, real_dcgettext, real_dcngettext};
use crate::state::{fatal, STATE};

/// Record the lookup and build the tagged return value, or hand back the
/// untouched `translated` pointer when the call is not recorded.
unsafe fn tag_lookup(
    func: &'static str,
    domain: *const c_char,
    msgid: *const c_char,
    msgid_plural: *const c_char,
    translated: *mut c_char,
) -> *mut c_char {
    let Some(lookup) = Lookup::from_raw(func, domain, msgid, msgid_plural, translated) else {
        return translated;
    };
    STATE
        .tag(&lookup)
        .and_then(leak_c_string)
        .unwrap_or(translated)
}

#[no_mangle]
pub unsafe extern "C" fn dcgettext(
    domain: *const c_char,
    msgid: *const c_char,
    category: c_int,
) -> *mut c_char {
    let real = real_dcgettext().unwrap_or_else(|err| fatal(err));
    let translated = real(domain, msgid, category);
    tag_lookup("dcgettext", domain, msgid, std::ptr::null(), translated)
}

#[no_mangle]
pub unsafe extern "C" fn dcngettext(
    domain: *const c_char,
    msgid: *const c_char,
    msgid_plural: *const c_char,
    n: c_ulong,
    category: c_int,
) -> *mut c_char {
    let real = real_dcngettext().unwrap_or_else(|err| fatal(err));
    let translated = real(domain, msgid, msgid_plural, n, category);
    tag_lookup("dcngettext", domain, msgid, msgid_plural, translated)
}
