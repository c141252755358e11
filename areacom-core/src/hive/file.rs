//! YAML-persisted hive.
//!
//! # Storage layout
//!
//! ```text
//! ~/.areacom/
//!   hive.yaml   (mode 0600, directory 0700)
//! ```
//!
//! Every mutation is load → apply → save. Saves go through a `.yaml.tmp`
//! sibling and a rename, so readers never observe a half-written document.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HiveEntry, KeyPath, MemoryHive, RegistryHive};
use crate::config::areacom_dir_at;
use crate::error::{io_err, RegistryError};

const HIVE_FILE: &str = "hive.yaml";
const HIVE_FORMAT_VERSION: u32 = 1;

/// On-disk hive document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HiveDocument {
    version: u32,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    keys: Vec<HiveEntry>,
}

/// A hive stored in a single YAML file.
#[derive(Debug, Clone)]
pub struct FileHive {
    path: PathBuf,
}

impl FileHive {
    /// Use the hive at `path`. No I/O happens until the first operation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<home>/.areacom/hive.yaml`: pure, no I/O.
    pub fn default_path_at(home: &Path) -> PathBuf {
        areacom_dir_at(home).join(HIVE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole hive. A missing file is an empty hive.
    pub fn load(&self) -> Result<MemoryHive, RegistryError> {
        self.load_for(&KeyPath::new(super::RegistryRoot::ClassesRoot))
    }

    fn load_for(&self, key: &KeyPath) -> Result<MemoryHive, RegistryError> {
        if !self.path.exists() {
            return Ok(MemoryHive::new());
        }
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| io_err(&self.path, key, e))?;
        let doc: HiveDocument =
            serde_yaml::from_str(&contents).map_err(|source| RegistryError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(MemoryHive::from_entries(doc.keys))
    }

    fn save_for(&self, key: &KeyPath, hive: &MemoryHive) -> Result<(), RegistryError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| io_err(dir, key, e))?;
                set_dir_permissions(dir).map_err(|e| io_err(dir, key, e))?;
            }
        }
        let doc = HiveDocument {
            version: HIVE_FORMAT_VERSION,
            updated_at: Utc::now(),
            keys: hive.entries().cloned().collect(),
        };
        let yaml = serde_yaml::to_string(&doc)?;
        let tmp_path = self.path.with_extension("yaml.tmp");
        std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, key, e))?;
        set_file_permissions(&tmp_path).map_err(|e| io_err(&tmp_path, key, e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| io_err(&self.path, key, e))?;
        Ok(())
    }

    fn mutate<F>(&self, key: &KeyPath, apply: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut MemoryHive) -> Result<(), RegistryError>,
    {
        let mut hive = self.load_for(key)?;
        apply(&mut hive)?;
        self.save_for(key, &hive)
    }
}

impl RegistryHive for FileHive {
    fn open_or_create_key(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        self.mutate(key, |hive| hive.open_or_create_key(key))
    }

    fn set_default_value(&mut self, key: &KeyPath, value: &str) -> Result<(), RegistryError> {
        self.mutate(key, |hive| hive.set_default_value(key, value))
    }

    fn delete_subtree(&mut self, key: &KeyPath) -> Result<(), RegistryError> {
        self.mutate(key, |hive| hive.delete_subtree(key))
    }

    fn default_value(&self, key: &KeyPath) -> Result<Option<String>, RegistryError> {
        self.load_for(key)?.default_value(key)
    }

    fn key_exists(&self, key: &KeyPath) -> Result<bool, RegistryError> {
        self.load_for(key)?.key_exists(key)
    }

    fn subkeys(&self, key: &KeyPath) -> Result<Vec<String>, RegistryError> {
        self.load_for(key)?.subkeys(key)
    }

    fn walk(&self, key: &KeyPath) -> Result<Vec<(KeyPath, Option<String>)>, RegistryError> {
        self.load_for(key)?.walk(key)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::RegistryRoot;
    use tempfile::TempDir;

    fn key(rel: &str) -> KeyPath {
        KeyPath::new(RegistryRoot::ClassesRoot).join(rel).expect("key")
    }

    #[test]
    fn default_path_is_under_areacom_dir() {
        let home = TempDir::new().expect("tempdir");
        assert!(FileHive::default_path_at(home.path()).ends_with(".areacom/hive.yaml"));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let home = TempDir::new().expect("tempdir");
        let hive = FileHive::open(FileHive::default_path_at(home.path()));
        assert!(!hive.key_exists(&key("TypeLib")).unwrap());
        assert!(hive.load().unwrap().is_empty());
    }

    #[test]
    fn writes_persist_across_instances() {
        let home = TempDir::new().expect("tempdir");
        let path = FileHive::default_path_at(home.path());
        let mut hive = FileHive::open(&path);
        hive.open_or_create_key(&key("TypeLib\\{A}\\1.0")).unwrap();
        hive.set_default_value(&key("TypeLib\\{A}\\1.0"), "Test Lib").unwrap();

        let reopened = FileHive::open(&path);
        assert_eq!(
            reopened.default_value(&key("TypeLib\\{A}\\1.0")).unwrap().as_deref(),
            Some("Test Lib")
        );
    }

    #[test]
    fn save_cleans_up_tmp_and_sets_perms() {
        let home = TempDir::new().expect("tempdir");
        let path = FileHive::default_path_at(home.path());
        let mut hive = FileHive::open(&path);
        hive.open_or_create_key(&key("TypeLib")).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("yaml.tmp").exists(), ".tmp must be gone after save");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let home = TempDir::new().expect("tempdir");
        let path = FileHive::default_path_at(home.path());
        let mut hive = FileHive::open(&path);
        let err = hive.delete_subtree(&key("TypeLib\\{A}")).unwrap_err();
        assert!(err.is_not_found());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_parse_error_with_path() {
        let home = TempDir::new().expect("tempdir");
        let path = FileHive::default_path_at(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b": : corrupt : yaml : !!!\n  - broken: [unclosed").unwrap();
        let err = FileHive::open(&path).key_exists(&key("TypeLib")).unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("hive.yaml"));
    }
}
