//! # CLI Structure and Argument Parsing
//!
//! The CLI follows a command-subcommand pattern. `convert` picks the export
//! target; Azure DevOps wiki is the only one today.
//!
//! ```bash
//! cfmd convert azure DEMO --base-url https://wiki.example.com --token "$TOKEN"
//! cfmd -q convert azure DEMO --user me@example.com --output-dir ./wiki
//! ```

use cfmd_core::{AttachmentLinkStyle, AttachmentNaming};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use url::Url;

/// Main CLI structure for the `cfmd` command.
#[derive(Parser, Clone, Debug)]
#[command(name = "cfmd")]
#[command(version)]
#[command(about = "cfmd - export a Confluence space as Markdown", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log every request and rewritten link
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Same as --verbose
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Convert a space into another wiki format
    Convert {
        #[command(subcommand)]
        target: ConvertTarget,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConvertTarget {
    /// Azure DevOps wiki layout
    Azure(AzureArgs),
}

/// Arguments of `cfmd convert azure`.
#[derive(Args, Clone, Debug)]
pub struct AzureArgs {
    /// Key of the space to export
    #[arg(value_name = "SPACE")]
    pub space: String,

    /// Wiki base URL, e.g. <https://wiki.example.com> or <https://host/confluence>
    #[arg(long, env = "CFMD_BASE_URL", value_parser = parse_base_url)]
    pub base_url: Option<String>,

    /// API token or personal access token (prompted for when omitted)
    #[arg(long, env = "CFMD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for basic auth; without it the token is sent as a bearer token
    #[arg(long, env = "CFMD_USER")]
    pub user: Option<String>,

    /// Extra header sent with every request (repeatable)
    #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Directory in which the space folder is created
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// How relocated attachments are linked
    #[arg(long, value_enum)]
    pub attachment_links: Option<LinkStyleArg>,

    /// How downloaded attachments are named
    #[arg(long = "attachment-names", value_enum)]
    pub attachment_naming: Option<NamingArg>,

    /// Config file to use instead of the default location
    #[arg(long, env = "CFMD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStyleArg {
    Relative,
    Absolute,
}

impl From<LinkStyleArg> for AttachmentLinkStyle {
    fn from(value: LinkStyleArg) -> Self {
        match value {
            LinkStyleArg::Relative => Self::Relative,
            LinkStyleArg::Absolute => Self::Absolute,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamingArg {
    Random,
    ContentHash,
}

impl From<NamingArg> for AttachmentNaming {
    fn from(value: NamingArg) -> Self {
        match value {
            NamingArg::Random => Self::Random,
            NamingArg::ContentHash => Self::ContentHash,
        }
    }
}

fn parse_base_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| format!("invalid URL '{trimmed}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("expected an http or https URL, got '{trimmed}'"));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
