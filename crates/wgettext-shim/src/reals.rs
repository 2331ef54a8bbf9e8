//! Real Symbol Storage
//!
//! Pointers to the definitions our exports shadow, looked up once with
//! `dlsym(RTLD_NEXT)` and cached for the life of the process.

use libc::{c_char, c_int, c_ulong, c_void};
use std::ffi::{CStr, CString};
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::error::{Result, ShimError};

pub type DcgettextFn = unsafe extern "C" fn(
    domain: *const c_char,
    msgid: *const c_char,
    category: c_int,
) -> *mut c_char;

pub type DcngettextFn = unsafe extern "C" fn(
    domain: *const c_char,
    msgid: *const c_char,
    msgid_plural: *const c_char,
    n: c_ulong,
    category: c_int,
) -> *mut c_char;

type TextdomainFn = unsafe extern "C" fn(domainname: *const c_char) -> *mut c_char;

/// Lazily resolved pointer to the next definition of `name`.
pub struct RealSymbol {
    ptr: AtomicPtr<c_void>,
    name: &'static CStr,
}

impl RealSymbol {
    pub const fn new(name: &'static CStr) -> Self {
        Self {
            ptr: AtomicPtr::new(std::ptr::null_mut()),
            name,
        }
    }

    /// Address of the next definition. Racing first calls both resolve to
    /// the same address, so a plain store is enough.
    pub fn get(&self) -> Result<*mut c_void> {
        let p = self.ptr.load(Ordering::Acquire);
        if !p.is_null() {
            return Ok(p);
        }
        let f = unsafe { libc::dlsym(libc::RTLD_NEXT, self.name.as_ptr()) };
        if f.is_null() {
            return Err(ShimError::Resolution {
                symbol: self.name.to_str().unwrap_or("?"),
            });
        }
        self.ptr.store(f, Ordering::Release);
        Ok(f)
    }
}

pub static REAL_DCGETTEXT: RealSymbol = RealSymbol::new(c"dcgettext");
pub static REAL_DCNGETTEXT: RealSymbol = RealSymbol::new(c"dcngettext");
pub static REAL_TEXTDOMAIN: RealSymbol = RealSymbol::new(c"textdomain");

pub fn real_dcgettext() -> Result<DcgettextFn> {
    let p = REAL_DCGETTEXT.get()?;
    Ok(unsafe { std::mem::transmute::<*mut c_void, DcgettextFn>(p) })
}

pub fn real_dcngettext() -> Result<DcngettextFn> {
    let p = REAL_DCNGETTEXT.get()?;
    Ok(unsafe { std::mem::transmute::<*mut c_void, DcngettextFn>(p) })
}

/// Current text domain, as `textdomain(NULL)` reports it. Not intercepted,
/// so a missing definition only costs the domain name.
pub fn current_textdomain() -> Option<Vec<u8>> {
    let f = REAL_TEXTDOMAIN.get().ok()?;
    let textdomain = unsafe { std::mem::transmute::<*mut c_void, TextdomainFn>(f) };
    let p = unsafe { textdomain(std::ptr::null()) };
    if p.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(p) }.to_bytes().to_vec())
}

/// Hand `bytes` to C. The allocation is never reclaimed: gettext callers
/// treat results as library-owned and never free them.
pub(crate) fn leak_c_string(bytes: Vec<u8>) -> Option<*mut c_char> {
    CString::new(bytes).ok().map(CString::into_raw)
}
