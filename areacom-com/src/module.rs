//! Location of the loaded module file.

use std::io;
use std::path::PathBuf;

/// Absolute path of the binary this code was loaded from (the DLL / shared
/// object when loaded by a host, the executable when linked statically).
#[cfg(windows)]
pub fn module_path() -> io::Result<PathBuf> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use std::ptr;

    use windows_sys::Win32::Foundation::HMODULE;
    use windows_sys::Win32::System::LibraryLoader::{
        GetModuleFileNameW, GetModuleHandleExW, GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS,
        GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
    };

    let anchor: fn() -> io::Result<PathBuf> = module_path;
    let mut module: HMODULE = ptr::null_mut();
    // SAFETY: FROM_ADDRESS treats the name argument as an address inside the
    // module; UNCHANGED_REFCOUNT means no handle needs releasing.
    let ok = unsafe {
        GetModuleHandleExW(
            GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS | GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
            anchor as *const u16,
            &mut module,
        )
    };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }

    let mut buf = vec![0u16; 260];
    loop {
        // SAFETY: `buf` has `buf.len()` writable u16 slots.
        let len = unsafe { GetModuleFileNameW(module, buf.as_mut_ptr(), buf.len() as u32) } as usize;
        if len == 0 {
            return Err(io::Error::last_os_error());
        }
        if len < buf.len() {
            buf.truncate(len);
            return Ok(PathBuf::from(OsString::from_wide(&buf)));
        }
        buf.resize(buf.len() * 2, 0);
    }
}

/// Absolute path of the binary this code was loaded from (the DLL / shared
/// object when loaded by a host, the executable when linked statically).
#[cfg(unix)]
pub fn module_path() -> io::Result<PathBuf> {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;

    let anchor: fn() -> io::Result<PathBuf> = module_path;
    // SAFETY: Dl_info is plain data; dladdr fills it in.
    let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
    // SAFETY: `anchor` is an address inside this object; `info` is a valid out pointer.
    let found = unsafe { libc::dladdr(anchor as *const libc::c_void, &mut info) };
    if found == 0 || info.dli_fname.is_null() {
        return Err(io::Error::other("dladdr could not resolve the module file"));
    }
    // SAFETY: dli_fname is a NUL-terminated string owned by the loader.
    let name = unsafe { CStr::from_ptr(info.dli_fname) };
    let path = PathBuf::from(OsStr::from_bytes(name.to_bytes()));
    if path.is_absolute() {
        Ok(path)
    } else {
        std::fs::canonicalize(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_path_points_at_existing_file() {
        let path = module_path().expect("module path");
        assert!(path.is_absolute(), "got: {}", path.display());
        assert!(path.is_file(), "got: {}", path.display());
    }
}
