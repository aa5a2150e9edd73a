//! memberbridge: sync the Conscribo member roster into Google Workspace.
//!
//! # Usage
//!
//! ```text
//! memberbridge [--properties <path>] sync [--dry-run] [--compare-names] [--json]
//! memberbridge [--properties <path>] users [--linked] [--json]
//! memberbridge [--properties <path>] fields [--json]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{fields::FieldsArgs, sync::SyncArgs, users::UsersArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "memberbridge",
    version,
    about = "Create and update directory accounts from the membership roster",
    long_about = None,
)]
struct Cli {
    /// Properties file (defaults to ~/.memberbridge/properties.yaml).
    #[arg(long, global = true, env = "MEMBERBRIDGE_PROPERTIES", value_name = "PATH")]
    properties: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one reconciliation pass over the full roster.
    Sync(SyncArgs),

    /// List every account in the directory domain.
    Users(UsersArgs),

    /// List the membership field definitions known to Conscribo.
    Fields(FieldsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let properties = cli.properties.as_deref();
    match cli.command {
        Commands::Sync(args) => args.run(properties),
        Commands::Users(args) => args.run(properties),
        Commands::Fields(args) => args.run(properties),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
