//! cfmd - export a Confluence space as an Azure DevOps wiki

use std::process::ExitCode;

use cfmd_cli::error::exit_code_from_error;
use colored::Colorize;

#[tokio::main]
async fn main() -> ExitCode {
    match cfmd_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
