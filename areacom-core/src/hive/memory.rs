//! In-memory hive. Also the working representation behind [`super::FileHive`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{KeyPath, RegistryHive};
use crate::error::RegistryError;

/// One stored key and its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveEntry {
    pub path: KeyPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A registry held entirely in memory.
///
/// Keys are indexed by their case-folded path; the spelling used at creation
/// time is kept for display. Root keys always exist and are never stored.
#[derive(Debug, Clone, Default)]
pub struct MemoryHive {
    entries: BTreeMap<String, HiveEntry>,
    denied: Vec<KeyPath>,
    unavailable: bool,
}

impl MemoryHive {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: impl IntoIterator<Item = HiveEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.path.folded(), e))
                .collect(),
            ..Self::default()
        }
    }

    /// All stored keys in case-insensitive path order.
    pub fn entries(&self) -> impl Iterator<Item = &HiveEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Make every write at or below `key` fail with `PermissionDenied`.
    pub fn deny_writes_under(&mut self, key: KeyPath) {
        self.denied.push(key);
    }

    /// Make every operation fail with `RegistryUnavailable` while set.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    fn check_available(&self) -> Result<(), RegistryError> {
        if self.unavailable {
            return Err(RegistryError::RegistryUnavailable {
                location: PathBuf::from("<memory>"),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    "hive marked unavailable",
                ),
            });
        }
        Ok(())
    }

    fn check_writable(&self, key: &KeyPath) -> Result<(), RegistryError> {
        self.check_available()?;
        if self.denied.iter().any(|d| key.is_within(d)) {
            return Err(RegistryError::PermissionDenied { key: key.clone() });
        }
        Ok(())
    }

    fn contains(&self, key: &KeyPath) -> bool {
        key.is_root() || self.entries.contains_key(&key.folded())
    }
}

impl RegistryHive for MemoryHive {
    fn open_or_create_key(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        self.check_writable(key)?;
        let mut current = KeyPath::new(key.root());
        for segment in key.segments() {
            current = current.join(segment)?;
            self.entries
                .entry(current.folded())
                .or_insert_with(|| HiveEntry {
                    path: current.clone(),
                    default: None,
                });
        }
        Ok(())
    }

    fn set_default_value(&mut self, key: &KeyPath, value: &str) -> Result<(), RegistryError> {
        self.check_writable(key)?;
        let entry = self
            .entries
            .get_mut(&key.folded())
            .ok_or_else(|| RegistryError::KeyNotFound { key: key.clone() })?;
        entry.default = Some(value.to_owned());
        Ok(())
    }

    fn delete_subtree(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        if key.is_root() {
            return Err(RegistryError::InvalidKeyPath(key.to_string()));
        }
        self.check_writable(key)?;
        if !self.contains(key) {
            return Err(RegistryError::KeyNotFound { key: key.clone() });
        }
        self.entries.retain(|_, entry| !entry.path.is_within(key));
        Ok(())
    }

    fn default_value(&self, key: &KeyPath) -> Result<Option<String>, RegistryError> {
        self.check_available()?;
        Ok(self
            .entries
            .get(&key.folded())
            .and_then(|entry| entry.default.clone()))
    }

    fn key_exists(&self, key: &KeyPath) -> Result<bool, RegistryError> {
        self.check_available()?;
        Ok(self.contains(key))
    }

    fn subkeys(&self, key: &KeyPath) -> Result<Vec<String>, RegistryError> {
        self.check_available()?;
        if !self.contains(key) {
            return Err(RegistryError::KeyNotFound { key: key.clone() });
        }
        let depth = key.segments().len() + 1;
        Ok(self
            .entries
            .values()
            .filter(|entry| entry.path.segments().len() == depth && entry.path.is_within(key))
            .filter_map(|entry| entry.path.name().map(str::to_owned))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::RegistryRoot;

    fn key(rel: &str) -> KeyPath {
        KeyPath::new(RegistryRoot::ClassesRoot).join(rel).expect("key")
    }

    #[test]
    fn open_or_create_creates_ancestors() {
        let mut hive = MemoryHive::new();
        hive.open_or_create_key(&key("TypeLib\\{A}\\1.0\\0\\win32")).unwrap();
        assert_eq!(hive.len(), 5);
        assert!(hive.key_exists(&key("TypeLib\\{A}\\1.0\\0")).unwrap());
    }

    #[test]
    fn open_or_create_is_idempotent_and_keeps_value() {
        let mut hive = MemoryHive::new();
        let k = key("TypeLib\\{A}");
        hive.open_or_create_key(&k).unwrap();
        hive.set_default_value(&k, "desc").unwrap();
        hive.open_or_create_key(&k).unwrap();
        assert_eq!(hive.default_value(&k).unwrap().as_deref(), Some("desc"));
        assert_eq!(hive.len(), 2);
    }

    #[test]
    fn lookup_ignores_case_and_keeps_original_spelling() {
        let mut hive = MemoryHive::new();
        hive.open_or_create_key(&key("TypeLib\\{AbC}")).unwrap();
        hive.set_default_value(&key("typelib\\{abc}"), "x").unwrap();
        assert_eq!(hive.subkeys(&key("TYPELIB")).unwrap(), vec!["{AbC}".to_owned()]);
        assert_eq!(hive.default_value(&key("TypeLib\\{ABC}")).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn set_value_on_missing_key_is_not_found() {
        let mut hive = MemoryHive::new();
        let err = hive.set_default_value(&key("Nope"), "v").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_subtree_removes_descendants_only() {
        let mut hive = MemoryHive::new();
        hive.open_or_create_key(&key("TypeLib\\{A}\\1.0\\FLAGS")).unwrap();
        hive.open_or_create_key(&key("TypeLib\\{AB}")).unwrap();
        hive.delete_subtree(&key("TypeLib\\{A}")).unwrap();
        assert!(!hive.key_exists(&key("TypeLib\\{A}\\1.0")).unwrap());
        assert!(hive.key_exists(&key("TypeLib\\{AB}")).unwrap());
        assert!(hive.key_exists(&key("TypeLib")).unwrap());
    }

    #[test]
    fn delete_missing_subtree_is_not_found() {
        let mut hive = MemoryHive::new();
        assert!(hive.delete_subtree(&key("TypeLib\\{A}")).unwrap_err().is_not_found());
    }

    #[test]
    fn denied_writes_fail_with_permission_denied() {
        let mut hive = MemoryHive::new();
        hive.deny_writes_under(key("TypeLib"));
        let err = hive.open_or_create_key(&key("TypeLib\\{A}")).unwrap_err();
        assert!(matches!(err, RegistryError::PermissionDenied { .. }), "got: {err}");
        assert!(hive.is_empty());
    }

    #[test]
    fn unavailable_hive_fails_reads_and_writes() {
        let mut hive = MemoryHive::new();
        hive.set_unavailable(true);
        assert!(matches!(
            hive.key_exists(&key("TypeLib")),
            Err(RegistryError::RegistryUnavailable { .. })
        ));
        assert!(matches!(
            hive.open_or_create_key(&key("TypeLib")),
            Err(RegistryError::RegistryUnavailable { .. })
        ));
    }

    #[test]
    fn walk_lists_depth_first() {
        let mut hive = MemoryHive::new();
        hive.open_or_create_key(&key("T\\a\\x")).unwrap();
        hive.open_or_create_key(&key("T\\b")).unwrap();
        let names: Vec<String> = hive
            .walk(&key("T"))
            .unwrap()
            .into_iter()
            .map(|(path, _)| path.subkey())
            .collect();
        assert_eq!(names, ["T", "T\\a", "T\\a\\x", "T\\b"]);
    }
}
