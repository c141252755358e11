//! HRESULT codes returned across the interop boundary.

use areacom_core::RegistryError;

#[allow(clippy::upper_case_acronyms)]
pub type HRESULT = i32;

pub const S_OK: HRESULT = 0;
pub const E_POINTER: HRESULT = 0x8000_4003_u32 as HRESULT;
pub const E_ACCESSDENIED: HRESULT = 0x8007_0005_u32 as HRESULT;
/// Type library could not be (un)registered.
pub const SELFREG_E_TYPELIB: HRESULT = 0x8004_0200_u32 as HRESULT;

/// Map a registration error onto the self-registration HRESULT convention.
pub fn from_error(err: &RegistryError) -> HRESULT {
    match err {
        RegistryError::PermissionDenied { .. } => E_ACCESSDENIED,
        _ => SELFREG_E_TYPELIB,
    }
}

pub fn from_result(result: Result<(), RegistryError>) -> HRESULT {
    match result {
        Ok(()) => S_OK,
        Err(err) => {
            tracing::error!(error = %err, "self-registration failed");
            from_error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use areacom_core::{KeyPath, RegistryRoot};

    #[test]
    fn codes_are_failures() {
        assert!(E_POINTER < 0);
        assert!(E_ACCESSDENIED < 0);
        assert!(SELFREG_E_TYPELIB < 0);
    }

    #[test]
    fn permission_denied_maps_to_access_denied() {
        let err = RegistryError::PermissionDenied {
            key: KeyPath::new(RegistryRoot::ClassesRoot),
        };
        assert_eq!(from_error(&err), E_ACCESSDENIED);
    }

    #[test]
    fn unavailable_maps_to_typelib_failure() {
        let err = RegistryError::RegistryUnavailable {
            location: "/nowhere".into(),
            source: std::io::Error::other("gone"),
        };
        assert_eq!(from_result(Err(err)), SELFREG_E_TYPELIB);
        assert_eq!(from_result(Ok(())), S_OK);
    }
}
