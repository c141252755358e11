//! Exported entry points against the file-backed hive.
//!
//! One test per file: it points `HOME` at a temporary directory for the whole
//! process.
#![cfg(unix)]

use areacom_com::hresult::S_OK;
use areacom_com::{module, DllRegisterServer, DllUnregisterServer};
use areacom_core::{FileHive, IdentityDescriptor, KeyPath, RegistryHive, RegistryRoot};
use tempfile::TempDir;

#[test]
fn register_and_unregister_through_exports() {
    let home = TempDir::new().expect("home");
    std::env::set_var("HOME", home.path());

    let identity = IdentityDescriptor::AREA_COMPONENT;
    let library = KeyPath::new(RegistryRoot::ClassesRoot)
        .join(&format!("TypeLib\\{}", identity.library_id))
        .expect("library key");
    let version = library.join(&identity.version.to_string()).expect("version key");
    let hive = FileHive::open(FileHive::default_path_at(home.path()));

    assert_eq!(DllRegisterServer(), S_OK);
    assert_eq!(DllRegisterServer(), S_OK, "register must be repeatable");

    assert_eq!(
        hive.default_value(&version).unwrap().as_deref(),
        Some(identity.description)
    );
    let expected_tlb = module::module_path().expect("module path").with_extension("tlb");
    assert_eq!(
        hive.default_value(&version.join("0\\win32").unwrap()).unwrap(),
        Some(expected_tlb.to_string_lossy().into_owned())
    );

    assert_eq!(DllUnregisterServer(), S_OK);
    assert!(!hive.key_exists(&library).unwrap());
    assert_eq!(DllUnregisterServer(), S_OK, "unregister must be repeatable");
}
