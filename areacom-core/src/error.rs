//! Error types for areacom-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::hive::KeyPath;

/// All errors that can arise from identity, hive, and registration operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing store could not be reached (I/O failure, native call failure).
    #[error("registry unavailable at {location}: {source}")]
    RegistryUnavailable {
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The caller lacks rights to create, write, or delete the key.
    #[error("permission denied for key {key}")]
    PermissionDenied { key: KeyPath },

    /// The key does not exist.
    #[error("key not found: {key}")]
    KeyNotFound { key: KeyPath },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.areacom/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// A key path string was empty, had an unknown root, or contained an empty segment.
    #[error("invalid key path '{0}'")]
    InvalidKeyPath(String),

    /// A unique identifier string could not be parsed.
    #[error("invalid identifier '{value}': {source}")]
    InvalidGuid {
        value: String,
        #[source]
        source: uuid::Error,
    },
}

impl RegistryError {
    /// `true` for [`RegistryError::KeyNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::KeyNotFound { .. })
    }
}

/// Map an I/O failure against the hive file at `location` onto the registry taxonomy.
///
/// `PermissionDenied` is reported against `key`; everything else means the store
/// itself is unusable.
pub(crate) fn io_err(
    location: impl Into<PathBuf>,
    key: &KeyPath,
    source: std::io::Error,
) -> RegistryError {
    if source.kind() == std::io::ErrorKind::PermissionDenied {
        return RegistryError::PermissionDenied { key: key.clone() };
    }
    RegistryError::RegistryUnavailable {
        location: location.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::RegistryRoot;

    #[test]
    fn permission_io_error_maps_to_permission_denied() {
        let key = KeyPath::new(RegistryRoot::ClassesRoot).join("TypeLib").unwrap();
        let err = io_err(
            "/tmp/hive.yaml",
            &key,
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, RegistryError::PermissionDenied { .. }), "got: {err}");
    }

    #[test]
    fn other_io_error_maps_to_unavailable() {
        let key = KeyPath::new(RegistryRoot::ClassesRoot);
        let err = io_err("/tmp/hive.yaml", &key, std::io::Error::other("disk gone"));
        assert!(matches!(err, RegistryError::RegistryUnavailable { .. }));
        assert!(err.to_string().contains("/tmp/hive.yaml"));
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(RegistryError::HomeNotFound.to_string().contains("home directory"));
    }
}
