//! Purpose: interop module for the area component.
//! Exports: `DllRegisterServer`, `DllUnregisterServer`, `ComputeArea`.
//! Invariants: exported functions never unwind; failures surface as HRESULTs.
//! Notes: registration targets the system registry on Windows and the
//! file-backed hive (`~/.areacom/hive.yaml` or the configured path) elsewhere.

mod exports;
pub mod hresult;
pub mod module;

use std::path::Path;

use areacom_core::{
    config, ComponentConfig, ComponentType, IdentityDescriptor, RegistrationController,
    RegistryError, RegistryHive,
};

pub use exports::{ComputeArea, DllRegisterServer, DllUnregisterServer};
pub use hresult::HRESULT;

/// Lifecycle step requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Register,
    Unregister,
}

/// Run `step` for the built component against `hive`, advertising `module`
/// as the module location.
pub fn run_lifecycle<H: RegistryHive>(
    step: Lifecycle,
    hive: H,
    module: &Path,
    config: &ComponentConfig,
) -> Result<(), RegistryError> {
    let mut controller = RegistrationController::from_config(
        hive,
        IdentityDescriptor::AREA_COMPONENT,
        module,
        config,
    );
    let component = ComponentType::area_component();
    match step {
        Lifecycle::Register => controller.register(&component),
        Lifecycle::Unregister => controller.unregister(&component),
    }
}

/// Resolve this module's path, configuration, and platform hive, then run `step`.
pub(crate) fn run_self(step: Lifecycle) -> Result<(), RegistryError> {
    let module = module::module_path().map_err(|source| RegistryError::RegistryUnavailable {
        location: "<module path>".into(),
        source,
    })?;
    let home = config::home()?;
    let config = config::load_at(&home)?;
    tracing::debug!(module = %module.display(), ?step, strategy = %config.strategy, "self-registration");

    #[cfg(windows)]
    let hive = areacom_core::NativeHive::new();
    #[cfg(not(windows))]
    let hive = areacom_core::FileHive::open(config.hive_path_at(&home));

    run_lifecycle(step, hive, &module, &config)
}
