//! AreaCom: host-side installer and test harness for the area component.
//!
//! # Usage
//!
//! ```text
//! areacom register [--module <path>] [--strategy typelib|user-marker] [--hive <file>]
//! areacom unregister [--strategy ...] [--hive <file>]
//! areacom show [--strategy ...] [--hive <file>]
//! areacom invoke <radius> [comment]
//! areacom identity [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    identity::IdentityArgs, invoke::InvokeArgs, register::RegisterArgs, show::ShowArgs,
    unregister::UnregisterArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "areacom",
    version,
    about = "Register, inspect, and invoke the AreaCom component",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the component's type library registration.
    Register(RegisterArgs),

    /// Remove the component's registration. Succeeds if nothing is registered.
    Unregister(UnregisterArgs),

    /// Show the keys currently registered for the component.
    Show(ShowArgs),

    /// Call the component's ComputeArea method.
    Invoke(InvokeArgs),

    /// Print the component's identifiers, version, and description.
    Identity(IdentityArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Register(args) => args.run(),
        Commands::Unregister(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Invoke(args) => args.run(),
        Commands::Identity(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
