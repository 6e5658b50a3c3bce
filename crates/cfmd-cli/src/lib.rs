//! cfmd CLI - export a Confluence space as an Azure DevOps wiki
//!
//! The binary in `main.rs` only maps the result of [`run`] onto an exit code.
use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
pub mod error;
mod utils;

use crate::utils::initialize_logging;
use cli::{Cli, Commands, ConvertTarget};

/// Execute the cfmd CLI with the current arguments and environment.
///
/// # Errors
///
/// Returns an error if logging cannot be initialized or the command fails.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;
    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Convert {
            target: ConvertTarget::Azure(args),
        } => {
            commands::convert_azure(args, quiet).await?;
        },
    }
    Ok(())
}
