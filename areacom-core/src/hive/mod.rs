//! Hierarchical key/value registry abstraction.
//!
//! The registration controller only ever talks to a [`RegistryHive`]. Three
//! backends exist:
//! - [`MemoryHive`]: in-process, with fault injection for tests
//! - [`FileHive`]: YAML-persisted hive under `~/.areacom/` for hosts without a
//!   system registry
//! - `NativeHive`: the Windows registry (Windows builds only)
//!
//! Key lookups are case-insensitive in every backend.

mod file;
mod memory;
#[cfg(windows)]
mod native;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

pub use file::FileHive;
pub use memory::{HiveEntry, MemoryHive};
#[cfg(windows)]
pub use native::NativeHive;

// ---------------------------------------------------------------------------
// Roots and paths
// ---------------------------------------------------------------------------

/// Well-known top-level hive a [`KeyPath`] hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryRoot {
    /// Machine-wide class registrations (`HKEY_CLASSES_ROOT`).
    ClassesRoot,
    /// Per-user settings (`HKEY_CURRENT_USER`).
    CurrentUser,
}

impl RegistryRoot {
    pub fn name(self) -> &'static str {
        match self {
            RegistryRoot::ClassesRoot => "HKEY_CLASSES_ROOT",
            RegistryRoot::CurrentUser => "HKEY_CURRENT_USER",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HKEY_CLASSES_ROOT" | "HKCR" => Some(RegistryRoot::ClassesRoot),
            "HKEY_CURRENT_USER" | "HKCU" => Some(RegistryRoot::CurrentUser),
            _ => None,
        }
    }
}

impl fmt::Display for RegistryRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Absolute path to a registry key: a root plus zero or more named segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyPath {
    root: RegistryRoot,
    segments: Vec<String>,
}

impl KeyPath {
    /// The root key itself.
    pub fn new(root: RegistryRoot) -> Self {
        Self {
            root,
            segments: Vec::new(),
        }
    }

    /// Append a relative path. Both `\` and `/` separate segments; empty
    /// segments are rejected.
    pub fn join(&self, relative: &str) -> Result<KeyPath, RegistryError> {
        let mut joined = self.clone();
        for segment in relative.split(['\\', '/']) {
            if segment.is_empty() {
                return Err(RegistryError::InvalidKeyPath(format!("{self}\\{relative}")));
            }
            joined.segments.push(segment.to_owned());
        }
        Ok(joined)
    }

    pub fn root(&self) -> RegistryRoot {
        self.root
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, or `None` for a root key.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path below the root, `\`-separated (what native APIs call the sub-key).
    pub fn subkey(&self) -> String {
        self.segments.join("\\")
    }

    /// `true` if `self` equals `ancestor` or lies beneath it (case-insensitive).
    pub fn is_within(&self, ancestor: &KeyPath) -> bool {
        self.root == ancestor.root
            && self.segments.len() >= ancestor.segments.len()
            && self
                .segments
                .iter()
                .zip(&ancestor.segments)
                .all(|(a, b)| a.to_lowercase() == b.to_lowercase())
    }

    /// Case-folded rendering used as a lookup key.
    pub(crate) fn folded(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root.name())?;
        for segment in &self.segments {
            write!(f, "\\{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (root, rest) = match s.find(['\\', '/']) {
            Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
            None => (s, None),
        };
        let root =
            RegistryRoot::parse(root).ok_or_else(|| RegistryError::InvalidKeyPath(s.to_owned()))?;
        let base = KeyPath::new(root);
        match rest {
            Some(rest) => base
                .join(rest)
                .map_err(|_| RegistryError::InvalidKeyPath(s.to_owned())),
            None => Ok(base),
        }
    }
}

impl TryFrom<String> for KeyPath {
    type Error = RegistryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<KeyPath> for String {
    fn from(path: KeyPath) -> Self {
        path.to_string()
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// The registry operations the registration controller depends on.
///
/// Read operations on a missing key: `default_value` → `Ok(None)`,
/// `key_exists` → `Ok(false)`, `subkeys` → `KeyNotFound`.
pub trait RegistryHive {
    /// Create `key` and any missing ancestors. Opening an existing key succeeds.
    fn open_or_create_key(&mut self, key: &KeyPath) -> Result<(), RegistryError>;

    /// Set the unnamed (default) string value of an existing key.
    fn set_default_value(&mut self, key: &KeyPath, value: &str) -> Result<(), RegistryError>;

    /// Delete `key` and everything beneath it. `KeyNotFound` if `key` is absent.
    fn delete_subtree(&mut self, key: &KeyPath) -> Result<(), RegistryError>;

    fn default_value(&self, key: &KeyPath) -> Result<Option<String>, RegistryError>;

    fn key_exists(&self, key: &KeyPath) -> Result<bool, RegistryError>;

    /// Names of the immediate children of `key`.
    fn subkeys(&self, key: &KeyPath) -> Result<Vec<String>, RegistryError>;

    /// Depth-first listing of `key` and all descendants with their default
    /// values. Empty if `key` does not exist.
    fn walk(&self, key: &KeyPath) -> Result<Vec<(KeyPath, Option<String>)>, RegistryError> {
        let mut out = Vec::new();
        if !self.key_exists(key)? {
            return Ok(out);
        }
        let mut stack = vec![key.clone()];
        while let Some(current) = stack.pop() {
            let value = self.default_value(&current)?;
            let mut children = self.subkeys(&current)?;
            children.reverse();
            for child in children {
                stack.push(current.join(&child)?);
            }
            out.push((current, value));
        }
        Ok(out)
    }
}

impl<H: RegistryHive + ?Sized> RegistryHive for &mut H {
    fn open_or_create_key(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        (**self).open_or_create_key(key)
    }

    fn set_default_value(&mut self, key: &KeyPath, value: &str) -> Result<(), RegistryError> {
        (**self).set_default_value(key, value)
    }

    fn delete_subtree(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        (**self).delete_subtree(key)
    }

    fn default_value(&self, key: &KeyPath) -> Result<Option<String>, RegistryError> {
        (**self).default_value(key)
    }

    fn key_exists(&self, key: &KeyPath) -> Result<bool, RegistryError> {
        (**self).key_exists(key)
    }

    fn subkeys(&self, key: &KeyPath) -> Result<Vec<String>, RegistryError> {
        (**self).subkeys(key)
    }

    fn walk(&self, key: &KeyPath) -> Result<Vec<(KeyPath, Option<String>)>, RegistryError> {
        (**self).walk(key)
    }
}

impl<H: RegistryHive + ?Sized> RegistryHive for Box<H> {
    fn open_or_create_key(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        (**self).open_or_create_key(key)
    }

    fn set_default_value(&mut self, key: &KeyPath, value: &str) -> Result<(), RegistryError> {
        (**self).set_default_value(key, value)
    }

    fn delete_subtree(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        (**self).delete_subtree(key)
    }

    fn default_value(&self, key: &KeyPath) -> Result<Option<String>, RegistryError> {
        (**self).default_value(key)
    }

    fn key_exists(&self, key: &KeyPath) -> Result<bool, RegistryError> {
        (**self).key_exists(key)
    }

    fn subkeys(&self, key: &KeyPath) -> Result<Vec<String>, RegistryError> {
        (**self).subkeys(key)
    }

    fn walk(&self, key: &KeyPath) -> Result<Vec<(KeyPath, Option<String>)>, RegistryError> {
        (**self).walk(key)
    }
}
