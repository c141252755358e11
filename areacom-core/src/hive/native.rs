//! The Windows system registry.

use std::path::PathBuf;
use std::ptr;

use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS, WIN32_ERROR,
};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegDeleteTreeW, RegEnumKeyExW, RegOpenKeyExW,
    RegQueryValueExW, RegSetValueExW, HKEY, HKEY_CLASSES_ROOT, HKEY_CURRENT_USER,
    KEY_ENUMERATE_SUB_KEYS, KEY_QUERY_VALUE, KEY_SET_VALUE, KEY_WRITE, REG_OPTION_NON_VOLATILE,
    REG_SAM_FLAGS, REG_SZ,
};

use super::{KeyPath, RegistryHive, RegistryRoot};
use crate::error::RegistryError;

/// Longest registry key name plus terminator.
const MAX_KEY_NAME: usize = 256;

/// Live access to `HKEY_CLASSES_ROOT` / `HKEY_CURRENT_USER`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeHive;

impl NativeHive {
    pub fn new() -> Self {
        Self
    }
}

struct OwnedKey(HKEY);

impl Drop for OwnedKey {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful RegOpenKeyExW/RegCreateKeyExW
        // and is closed exactly once.
        unsafe {
            RegCloseKey(self.0);
        }
    }
}

fn root_handle(root: RegistryRoot) -> HKEY {
    match root {
        RegistryRoot::ClassesRoot => HKEY_CLASSES_ROOT,
        RegistryRoot::CurrentUser => HKEY_CURRENT_USER,
    }
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn check(status: WIN32_ERROR, key: &KeyPath) -> Result<(), RegistryError> {
    match status {
        ERROR_SUCCESS => Ok(()),
        ERROR_ACCESS_DENIED => Err(RegistryError::PermissionDenied { key: key.clone() }),
        ERROR_FILE_NOT_FOUND => Err(RegistryError::KeyNotFound { key: key.clone() }),
        code => Err(RegistryError::RegistryUnavailable {
            location: PathBuf::from(key.to_string()),
            source: std::io::Error::from_raw_os_error(code as i32),
        }),
    }
}

fn create(key: &KeyPath, access: REG_SAM_FLAGS) -> Result<OwnedKey, RegistryError> {
    let subkey = wide(&key.subkey());
    let mut handle: HKEY = ptr::null_mut();
    // SAFETY: `subkey` is NUL-terminated and outlives the call; `handle` is a
    // valid out pointer; class, security attributes and disposition may be null.
    let status = unsafe {
        RegCreateKeyExW(
            root_handle(key.root()),
            subkey.as_ptr(),
            0,
            ptr::null(),
            REG_OPTION_NON_VOLATILE,
            access,
            ptr::null(),
            &mut handle,
            ptr::null_mut(),
        )
    };
    check(status, key)?;
    Ok(OwnedKey(handle))
}

fn open(key: &KeyPath, access: REG_SAM_FLAGS) -> Result<OwnedKey, RegistryError> {
    let subkey = wide(&key.subkey());
    let mut handle: HKEY = ptr::null_mut();
    // SAFETY: `subkey` is NUL-terminated and outlives the call; `handle` is a
    // valid out pointer.
    let status =
        unsafe { RegOpenKeyExW(root_handle(key.root()), subkey.as_ptr(), 0, access, &mut handle) };
    check(status, key)?;
    Ok(OwnedKey(handle))
}

impl RegistryHive for NativeHive {
    fn open_or_create_key(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        create(key, KEY_WRITE).map(drop)
    }

    fn set_default_value(&mut self, key: &KeyPath, value: &str) -> Result<(), RegistryError> {
        let handle = open(key, KEY_SET_VALUE)?;
        let data = wide(value);
        let byte_len = (data.len() * std::mem::size_of::<u16>()) as u32;
        // SAFETY: `data` is a NUL-terminated UTF-16 buffer of `byte_len` bytes;
        // a null value name addresses the default value.
        let status = unsafe {
            RegSetValueExW(handle.0, ptr::null(), 0, REG_SZ, data.as_ptr().cast(), byte_len)
        };
        check(status, key)
    }

    fn delete_subtree(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        if key.is_root() {
            return Err(RegistryError::InvalidKeyPath(key.to_string()));
        }
        let subkey = wide(&key.subkey());
        // SAFETY: `subkey` is NUL-terminated and names a key below a predefined root.
        let status = unsafe { RegDeleteTreeW(root_handle(key.root()), subkey.as_ptr()) };
        check(status, key)
    }

    fn default_value(&self, key: &KeyPath) -> Result<Option<String>, RegistryError> {
        let handle = match open(key, KEY_QUERY_VALUE) {
            Ok(handle) => handle,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        let mut value_type = 0;
        let mut byte_len = 0u32;
        // SAFETY: size query; data pointer is null and `byte_len` receives the size.
        let status = unsafe {
            RegQueryValueExW(
                handle.0,
                ptr::null(),
                ptr::null(),
                &mut value_type,
                ptr::null_mut(),
                &mut byte_len,
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        check(status, key)?;
        if value_type != REG_SZ {
            return Ok(None);
        }

        let mut buf = vec![0u16; (byte_len as usize).div_ceil(2) + 1];
        let mut byte_len = (buf.len() * std::mem::size_of::<u16>()) as u32;
        // SAFETY: `buf` holds `byte_len` writable bytes.
        let status = unsafe {
            RegQueryValueExW(
                handle.0,
                ptr::null(),
                ptr::null(),
                &mut value_type,
                buf.as_mut_ptr().cast(),
                &mut byte_len,
            )
        };
        check(status, key)?;
        buf.truncate(byte_len as usize / 2);
        while buf.last() == Some(&0) {
            buf.pop();
        }
        Ok(Some(String::from_utf16_lossy(&buf)))
    }

    fn key_exists(&self, key: &KeyPath) -> Result<bool, RegistryError> {
        match open(key, KEY_QUERY_VALUE) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn subkeys(&self, key: &KeyPath) -> Result<Vec<String>, RegistryError> {
        let handle = open(key, KEY_ENUMERATE_SUB_KEYS)?;
        let mut names = Vec::new();
        let mut index = 0u32;
        loop {
            let mut name = [0u16; MAX_KEY_NAME];
            let mut len = name.len() as u32;
            // SAFETY: `name` has `len` u16 slots; the remaining out pointers are optional.
            let status = unsafe {
                RegEnumKeyExW(
                    handle.0,
                    index,
                    name.as_mut_ptr(),
                    &mut len,
                    ptr::null(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                )
            };
            if status == ERROR_NO_MORE_ITEMS {
                break;
            }
            check(status, key)?;
            names.push(String::from_utf16_lossy(&name[..len as usize]));
            index += 1;
        }
        Ok(names)
    }
}
