//! AreaCom core library: component identity, registry hives, self-registration.
//!
//! Public API surface:
//! - [`identity`]: [`Guid`], [`TypeLibVersion`], [`IdentityDescriptor`]
//! - [`hive`]: [`KeyPath`] and the [`RegistryHive`] capability with its backends
//! - [`registration`]: [`RegistrationController`] (register / unregister)
//! - [`config`]: [`ComponentConfig`] load with `_at(home)` variants
//! - [`area`]: the exposed placeholder operation
//! - [`error`]: [`RegistryError`]

pub mod area;
pub mod config;
pub mod error;
pub mod hive;
pub mod identity;
pub mod registration;

pub use area::compute_area;
pub use config::ComponentConfig;
pub use error::RegistryError;
pub use hive::{FileHive, KeyPath, MemoryHive, RegistryHive, RegistryRoot};
pub use identity::{Guid, IdentityDescriptor, TypeLibVersion};
pub use registration::{ComponentType, RegistrationController, RegistrationStrategy};

#[cfg(windows)]
pub use hive::NativeHive;
