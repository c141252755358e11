//! `areacom unregister`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use areacom_core::ComponentType;

use super::{default_module_path, TargetArgs};

#[derive(Args, Debug)]
pub struct UnregisterArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl UnregisterArgs {
    pub fn run(self) -> Result<()> {
        let (mut controller, hive_name) = self.target.controller(default_module_path()?)?;
        let library = controller.library_key()?;

        controller
            .unregister(&ComponentType::area_component())
            .with_context(|| format!("failed to unregister {library} from {hive_name}"))?;

        println!("{} Unregistered {} from {}", "✓".green().bold(), library, hive_name);
        Ok(())
    }
}
