//! `areacom identity [--json]`

use anyhow::Result;
use clap::Args;

use areacom_core::IdentityDescriptor;

#[derive(Args, Debug)]
pub struct IdentityArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl IdentityArgs {
    pub fn run(self) -> Result<()> {
        let id = IdentityDescriptor::AREA_COMPONENT;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&id)?);
            return Ok(());
        }
        println!("description: {}", id.description);
        println!("version:     {}", id.version);
        println!("library:     {}", id.library_id);
        println!("class:       {}", id.class_id);
        println!("interface:   {}", id.interface_id);
        Ok(())
    }
}
