//! `areacom invoke <radius> [comment]`

use anyhow::Result;
use clap::Args;

use areacom_core::compute_area;

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Circle radius. Not validated.
    #[arg(allow_negative_numbers = true)]
    pub radius: f64,

    /// Free-form string passed alongside the radius.
    #[arg(default_value = "")]
    pub comment: String,
}

impl InvokeArgs {
    pub fn run(self) -> Result<()> {
        println!("{}", compute_area(self.radius, &self.comment));
        Ok(())
    }
}
