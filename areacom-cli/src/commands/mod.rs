//! Subcommands and the hive selection they share.

pub mod identity;
pub mod invoke;
pub mod register;
pub mod show;
pub mod unregister;

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use areacom_core::{
    config, ComponentConfig, FileHive, IdentityDescriptor, RegistrationController,
    RegistrationStrategy, RegistryHive,
};

/// Where registration is read from / written to.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Registration layout; overrides `strategy` in ~/.areacom/config.yaml.
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<RegistrationStrategy>,

    /// File-backed hive to use instead of ~/.areacom/hive.yaml.
    #[arg(long, value_name = "FILE")]
    pub hive: Option<PathBuf>,

    /// Use the Windows system registry (takes precedence over --hive).
    #[cfg(windows)]
    #[arg(long)]
    pub native: bool,
}

impl TargetArgs {
    /// Effective configuration: config file, then command-line overrides.
    pub fn config(&self) -> Result<(PathBuf, ComponentConfig)> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let mut cfg = config::load_at(&home).with_context(|| {
            format!(
                "failed to load {}",
                config::config_path_at(&home).display()
            )
        })?;
        if let Some(strategy) = self.strategy {
            cfg.strategy = strategy;
        }
        if let Some(hive) = &self.hive {
            cfg.hive_path = Some(hive.clone());
        }
        Ok((home, cfg))
    }

    /// Open the selected hive; `description` names it for output.
    pub fn open_hive(&self, home: &Path, cfg: &ComponentConfig) -> (Box<dyn RegistryHive>, String) {
        #[cfg(windows)]
        if self.native {
            return (Box::new(areacom_core::NativeHive::new()), "system registry".to_owned());
        }
        let path = cfg.hive_path_at(home);
        let description = path.display().to_string();
        (Box::new(FileHive::open(path)), description)
    }

    /// Controller for the built component over the selected hive.
    pub fn controller(
        &self,
        module: PathBuf,
    ) -> Result<(RegistrationController<Box<dyn RegistryHive>>, String)> {
        let (home, cfg) = self.config()?;
        let (hive, description) = self.open_hive(&home, &cfg);
        let controller = RegistrationController::from_config(
            hive,
            IdentityDescriptor::AREA_COMPONENT,
            module,
            &cfg,
        );
        Ok((controller, description))
    }
}

/// The interop module installed next to this executable
/// (`areacom_com.dll`, `libareacom_com.so`, `libareacom_com.dylib`).
pub fn default_module_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the areacom executable")?;
    let dir = exe
        .parent()
        .context("areacom executable has no parent directory")?;
    Ok(dir.join(format!("{DLL_PREFIX}areacom_com{DLL_SUFFIX}")))
}
