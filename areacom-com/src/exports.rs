//! C ABI entry points. Names follow the self-registration convention hosts
//! look up by symbol.
#![allow(non_snake_case)]

use std::panic::{catch_unwind, AssertUnwindSafe};

use areacom_core::compute_area;

use crate::hresult::{self, E_POINTER, HRESULT, S_OK, SELFREG_E_TYPELIB};
use crate::{run_self, Lifecycle};

/// Called by the host after the module is placed on disk.
#[no_mangle]
pub extern "system" fn DllRegisterServer() -> HRESULT {
    guarded(|| hresult::from_result(run_self(Lifecycle::Register)))
}

/// Called by the host before the module is removed.
#[no_mangle]
pub extern "system" fn DllUnregisterServer() -> HRESULT {
    guarded(|| hresult::from_result(run_self(Lifecycle::Unregister)))
}

/// `double ComputeArea(double radius, string comment)`, returned through `result`.
///
/// # Safety
///
/// `comment` must be null or point to a NUL-terminated UTF-16 string (a BSTR
/// qualifies). `result` must be null or valid for a single `f64` write.
#[no_mangle]
pub unsafe extern "system" fn ComputeArea(
    radius: f64,
    comment: *const u16,
    result: *mut f64,
) -> HRESULT {
    if result.is_null() {
        return E_POINTER;
    }
    // SAFETY: caller contract above.
    let comment = unsafe { wide_to_string(comment) };
    let area = compute_area(radius, &comment);
    // SAFETY: `result` is non-null and writable per the caller contract.
    unsafe { result.write(area) };
    S_OK
}

fn guarded(f: impl FnOnce() -> HRESULT) -> HRESULT {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        tracing::error!("panic during self-registration");
        SELFREG_E_TYPELIB
    })
}

/// Copy a NUL-terminated UTF-16 string. Null reads as empty.
///
/// # Safety
///
/// `ptr` must be null or point to a readable NUL-terminated `u16` sequence.
unsafe fn wide_to_string(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0;
    // SAFETY: the sequence is NUL-terminated, so every read up to the terminator is in bounds.
    while unsafe { *ptr.add(len) } != 0 {
        len += 1;
    }
    // SAFETY: `len` elements were just read successfully.
    let units = unsafe { std::slice::from_raw_parts(ptr, len) };
    String::from_utf16_lossy(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    #[test]
    fn compute_area_through_abi() {
        let comment = wide("abcxyz");
        let mut out = 0.0;
        let hr = unsafe { ComputeArea(2.0, comment.as_ptr(), &mut out) };
        assert_eq!(hr, S_OK);
        assert_eq!(out, 12.566370614359172);
    }

    #[test]
    fn null_comment_is_empty_string() {
        let mut out = 0.0;
        let hr = unsafe { ComputeArea(1.0, ptr::null(), &mut out) };
        assert_eq!(hr, S_OK);
        assert_eq!(out, std::f64::consts::PI);
    }

    #[test]
    fn null_result_is_e_pointer() {
        let comment = wide("x");
        let hr = unsafe { ComputeArea(1.0, comment.as_ptr(), ptr::null_mut()) };
        assert_eq!(hr, E_POINTER);
    }

    #[test]
    fn wide_strings_round_trip() {
        let text = "π r² — ✓";
        let buf = wide(text);
        assert_eq!(unsafe { wide_to_string(buf.as_ptr()) }, text);
    }

    #[test]
    fn guarded_converts_panic() {
        assert_eq!(guarded(|| panic!("boom")), SELFREG_E_TYPELIB);
        assert_eq!(guarded(|| S_OK), S_OK);
    }
}
