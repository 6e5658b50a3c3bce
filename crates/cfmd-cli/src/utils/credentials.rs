//! Token lookup for the export commands.

use anyhow::Result;
use inquire::Password;
use is_terminal::IsTerminal;

use crate::error::CliError;

/// Environment variable that disables interactive prompts.
pub const FORCE_NON_INTERACTIVE_ENV: &str = "CFMD_FORCE_NON_INTERACTIVE";

/// Return the token from the flag or environment, or prompt for it.
///
/// Prompting only happens on an interactive terminal. Otherwise a missing
/// token is a usage error.
pub fn resolve_token(token: Option<String>, user: Option<&str>) -> Result<String> {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        return Ok(token);
    }

    if !can_prompt() {
        return Err(CliError::usage(anyhow::anyhow!(
            "An API token is required: pass --token or set CFMD_TOKEN"
        ))
        .into());
    }

    let message = user.map_or_else(
        || "API token:".to_string(),
        |user| format!("API token for {user}:"),
    );
    let token = Password::new(&message)
        .without_confirmation()
        .with_help_message("Input is hidden")
        .prompt()?;

    if token.trim().is_empty() {
        return Err(CliError::usage(anyhow::anyhow!("An empty API token was entered")).into());
    }
    Ok(token)
}

fn can_prompt() -> bool {
    let forced = std::env::var_os(FORCE_NON_INTERACTIVE_ENV).is_some_and(|v| v != "0");
    !forced && std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}
