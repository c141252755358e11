//! Self-registration: advertise the component's type library in the registry
//! on install and retract it on uninstall.
//!
//! # Key layout (`TypeLib` strategy)
//!
//! ```text
//! HKEY_CLASSES_ROOT\TypeLib\{library-id}\
//!   {major}.{minor}        (default) = description
//!     0\win32              (default) = <module path with extension replaced>
//!     FLAGS                (default) = "0"
//! ```
//!
//! The `UserMarker` strategy writes a single per-user key instead:
//!
//! ```text
//! HKEY_CURRENT_USER\Software\Classes\TypeLib\{library-id}   (default) = {major}.{minor}
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ComponentConfig;
use crate::error::RegistryError;
use crate::hive::{KeyPath, RegistryHive, RegistryRoot};
use crate::identity::{Guid, IdentityDescriptor};

/// Default type library extension substituted onto the module path.
pub const DEFAULT_TYPELIB_EXTENSION: &str = "tlb";

/// Literal written to the `FLAGS` key (no `LIBFLAG_*` bits set).
pub const TYPELIB_FLAGS: &str = "0";

/// Locale id / platform sub-path holding the type library file path.
const WIN32_SUBKEY: &str = "0\\win32";
const FLAGS_SUBKEY: &str = "FLAGS";

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Which key tree `register` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegistrationStrategy {
    /// Full type library tree under `HKEY_CLASSES_ROOT`.
    #[default]
    #[serde(rename = "typelib")]
    TypeLib,
    /// A single per-user marker key carrying the version.
    #[serde(rename = "user-marker")]
    UserMarker,
}

impl fmt::Display for RegistrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStrategy::TypeLib => write!(f, "typelib"),
            RegistrationStrategy::UserMarker => write!(f, "user-marker"),
        }
    }
}

impl FromStr for RegistrationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "typelib" => Ok(RegistrationStrategy::TypeLib),
            "user-marker" | "marker" => Ok(RegistrationStrategy::UserMarker),
            other => Err(format!(
                "unknown registration strategy '{other}'; expected: typelib, user-marker"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Host-supplied type reference
// ---------------------------------------------------------------------------

/// The type reference a host passes to register/unregister. Only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentType {
    pub name: String,
    pub class_id: Guid,
}

impl ComponentType {
    pub fn area_component() -> Self {
        Self {
            name: "AreaComponent".to_owned(),
            class_id: IdentityDescriptor::AREA_COMPONENT.class_id,
        }
    }
}

/// `module` with its extension replaced by `extension` (`a/ComTest.dll` → `a/ComTest.tlb`).
pub fn typelib_path(module: &Path, extension: &str) -> PathBuf {
    module.with_extension(extension)
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Writes and removes the component's registry entries.
#[derive(Debug)]
pub struct RegistrationController<H> {
    hive: H,
    identity: IdentityDescriptor,
    module_path: PathBuf,
    strategy: RegistrationStrategy,
    typelib_extension: String,
}

impl<H: RegistryHive> RegistrationController<H> {
    pub fn new(hive: H, identity: IdentityDescriptor, module_path: impl Into<PathBuf>) -> Self {
        Self {
            hive,
            identity,
            module_path: module_path.into(),
            strategy: RegistrationStrategy::default(),
            typelib_extension: DEFAULT_TYPELIB_EXTENSION.to_owned(),
        }
    }

    /// Controller with strategy and extension taken from `config`.
    pub fn from_config(
        hive: H,
        identity: IdentityDescriptor,
        module_path: impl Into<PathBuf>,
        config: &ComponentConfig,
    ) -> Self {
        Self::new(hive, identity, module_path)
            .with_strategy(config.strategy)
            .with_typelib_extension(config.typelib_extension.clone())
    }

    pub fn with_strategy(mut self, strategy: RegistrationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_typelib_extension(mut self, extension: impl Into<String>) -> Self {
        self.typelib_extension = extension.into();
        self
    }

    pub fn hive(&self) -> &H {
        &self.hive
    }

    pub fn into_hive(self) -> H {
        self.hive
    }

    pub fn identity(&self) -> &IdentityDescriptor {
        &self.identity
    }

    pub fn strategy(&self) -> RegistrationStrategy {
        self.strategy
    }

    /// Root of everything this component writes; `unregister` deletes it.
    pub fn library_key(&self) -> Result<KeyPath, RegistryError> {
        let library = self.identity.library_id.to_string();
        match self.strategy {
            RegistrationStrategy::TypeLib => {
                KeyPath::new(RegistryRoot::ClassesRoot).join(&format!("TypeLib\\{library}"))
            }
            RegistrationStrategy::UserMarker => KeyPath::new(RegistryRoot::CurrentUser)
                .join(&format!("Software\\Classes\\TypeLib\\{library}")),
        }
    }

    /// `<library key>\{major}.{minor}`.
    pub fn version_key(&self) -> Result<KeyPath, RegistryError> {
        self.library_key()?.join(&self.identity.version.to_string())
    }

    /// Type library location advertised under `0\win32`.
    pub fn typelib_path(&self) -> PathBuf {
        typelib_path(&self.module_path, &self.typelib_extension)
    }

    /// Create the registry entries. Safe to repeat.
    ///
    /// If a step fails and the library key did not exist beforehand, the
    /// partially written subtree is removed (best effort) before the original
    /// error is returned.
    pub fn register(&mut self, component: &ComponentType) -> Result<(), RegistryError> {
        let library = self.library_key()?;
        let existed = self.hive.key_exists(&library)?;

        let written = match self.strategy {
            RegistrationStrategy::TypeLib => self.write_typelib_tree(&library),
            RegistrationStrategy::UserMarker => self.write_marker(&library),
        };
        if let Err(err) = written {
            if !existed {
                self.rollback(&library);
            }
            return Err(err);
        }

        tracing::info!(
            component = %component.name,
            class_id = %component.class_id,
            key = %library,
            strategy = %self.strategy,
            "registered type library"
        );
        Ok(())
    }

    /// Delete the library subtree. An absent subtree counts as success.
    pub fn unregister(&mut self, component: &ComponentType) -> Result<(), RegistryError> {
        let library = self.library_key()?;
        match self.hive.delete_subtree(&library) {
            Ok(()) => {
                tracing::info!(
                    component = %component.name,
                    class_id = %component.class_id,
                    key = %library,
                    "unregistered type library"
                );
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(key = %library, "nothing to unregister");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn write_typelib_tree(&mut self, library: &KeyPath) -> Result<(), RegistryError> {
        self.hive.open_or_create_key(library)?;

        let version = library.join(&self.identity.version.to_string())?;
        self.write_key(&version, self.identity.description)?;

        let typelib = self.typelib_path();
        self.write_key(&version.join(WIN32_SUBKEY)?, &typelib.to_string_lossy())?;
        self.write_key(&version.join(FLAGS_SUBKEY)?, TYPELIB_FLAGS)
    }

    fn write_marker(&mut self, library: &KeyPath) -> Result<(), RegistryError> {
        let version = self.identity.version.to_string();
        self.write_key(library, &version)
    }

    fn write_key(&mut self, key: &KeyPath, value: &str) -> Result<(), RegistryError> {
        self.hive.open_or_create_key(key)?;
        self.hive.set_default_value(key, value)?;
        tracing::debug!(key = %key, value, "wrote registry key");
        Ok(())
    }

    fn rollback(&mut self, library: &KeyPath) {
        match self.hive.delete_subtree(library) {
            Ok(()) => tracing::debug!(key = %library, "rolled back partial registration"),
            Err(err) if err.is_not_found() => {}
            Err(err) => tracing::warn!(
                key = %library,
                error = %err,
                "rollback of partial registration failed"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::MemoryHive;
    use crate::identity::TypeLibVersion;
    use rstest::rstest;

    fn identity() -> IdentityDescriptor {
        IdentityDescriptor {
            version: TypeLibVersion::new(1, 0),
            description: "Test Lib",
            ..IdentityDescriptor::AREA_COMPONENT
        }
    }

    fn controller() -> RegistrationController<MemoryHive> {
        RegistrationController::new(MemoryHive::new(), identity(), "/opt/areacom/ComTest.dll")
    }

    #[test]
    fn typelib_path_replaces_extension() {
        assert_eq!(
            typelib_path(Path::new("/opt/areacom/ComTest.dll"), "tlb"),
            PathBuf::from("/opt/areacom/ComTest.tlb")
        );
        assert_eq!(
            typelib_path(Path::new("/opt/areacom/ComTest.dll"), "comhost.tlb"),
            PathBuf::from("/opt/areacom/ComTest.comhost.tlb")
        );
        assert_eq!(
            typelib_path(Path::new("/opt/areacom/ComTest"), "tlb"),
            PathBuf::from("/opt/areacom/ComTest.tlb")
        );
    }

    #[test]
    fn library_key_uses_library_id() {
        let ctl = controller();
        assert_eq!(
            ctl.library_key().unwrap().to_string(),
            "HKEY_CLASSES_ROOT\\TypeLib\\{47A20781-26AD-465F-BDA9-AC59CEA74B69}"
        );
        assert!(ctl.version_key().unwrap().to_string().ends_with("}\\1.0"));
    }

    #[test]
    fn marker_strategy_lives_under_current_user() {
        let ctl = controller().with_strategy(RegistrationStrategy::UserMarker);
        let key = ctl.library_key().unwrap();
        assert_eq!(key.root(), RegistryRoot::CurrentUser);
        assert_eq!(
            key.subkey(),
            "Software\\Classes\\TypeLib\\{47A20781-26AD-465F-BDA9-AC59CEA74B69}"
        );
    }

    #[rstest]
    #[case("typelib", RegistrationStrategy::TypeLib)]
    #[case("TypeLib", RegistrationStrategy::TypeLib)]
    #[case("user-marker", RegistrationStrategy::UserMarker)]
    #[case("marker", RegistrationStrategy::UserMarker)]
    fn strategy_parses(#[case] input: &str, #[case] expected: RegistrationStrategy) {
        assert_eq!(input.parse::<RegistrationStrategy>().unwrap(), expected);
    }

    #[test]
    fn strategy_rejects_unknown() {
        let err = "hklm".parse::<RegistrationStrategy>().unwrap_err();
        assert!(err.contains("unknown registration strategy"));
    }

    #[test]
    fn marker_register_writes_single_key() {
        let mut ctl = controller().with_strategy(RegistrationStrategy::UserMarker);
        ctl.register(&ComponentType::area_component()).unwrap();
        let key = ctl.library_key().unwrap();
        assert_eq!(ctl.hive().default_value(&key).unwrap().as_deref(), Some("1.0"));
        assert!(ctl.hive().subkeys(&key).unwrap().is_empty());
    }

    #[test]
    fn rollback_removes_partial_tree() {
        let mut hive = MemoryHive::new();
        let ctl = controller();
        hive.deny_writes_under(ctl.version_key().unwrap().join("FLAGS").unwrap());
        let library = ctl.library_key().unwrap();
        let mut ctl = RegistrationController::new(hive, identity(), "/opt/areacom/ComTest.dll");

        let err = ctl.register(&ComponentType::area_component()).unwrap_err();
        assert!(matches!(err, RegistryError::PermissionDenied { .. }), "got: {err}");
        assert!(!ctl.hive().key_exists(&library).unwrap());
    }
}
