//! `areacom register [--module <path>] [--extension <ext>]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use areacom_core::{ComponentType, RegistryHive};

use super::{default_module_path, TargetArgs};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Installed module file. Defaults to the areacom_com library next to this executable.
    #[arg(long, value_name = "PATH")]
    pub module: Option<PathBuf>,

    /// Type library extension substituted onto the module path.
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,
}

impl RegisterArgs {
    pub fn run(self) -> Result<()> {
        let module = match self.module {
            Some(path) => std::path::absolute(&path)
                .with_context(|| format!("cannot resolve path '{}'", path.display()))?,
            None => default_module_path()?,
        };
        tracing::debug!(module = %module.display(), "resolved module path");

        let (mut controller, hive_name) = self.target.controller(module)?;
        if let Some(ext) = self.extension {
            controller = controller.with_typelib_extension(ext);
        }
        let library = controller.library_key()?;

        controller
            .register(&ComponentType::area_component())
            .with_context(|| format!("failed to register {library} in {hive_name}"))?;

        println!("{} Registered {} in {}", "✓".green().bold(), library, hive_name);
        for (key, value) in controller.hive().walk(&library)? {
            match value {
                Some(value) => println!("  {key} = {value}"),
                None => println!("  {key}"),
            }
        }
        Ok(())
    }
}
