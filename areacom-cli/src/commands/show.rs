//! `areacom show`: registered keys as a table.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use super::{default_module_path, TargetArgs};

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Tabled)]
struct KeyRow {
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "value")]
    value: String,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let (controller, hive_name) = self.target.controller(default_module_path()?)?;
        let library = controller.library_key()?;
        let entries = controller
            .hive()
            .walk(&library)
            .with_context(|| format!("failed to read {hive_name}"))?;

        if entries.is_empty() {
            println!("{} {} is not registered in {}", "■".yellow().bold(), library, hive_name);
            return Ok(());
        }

        let rows: Vec<KeyRow> = entries
            .into_iter()
            .map(|(key, value)| KeyRow {
                key: key.to_string(),
                value: value.unwrap_or_else(|| "(not set)".to_owned()),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
