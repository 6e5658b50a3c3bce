//! `cfmd convert azure` implementation.

use anyhow::{Context, Result};
use cfmd_core::{Config, Credentials, ExportSummary, Exporter};
use colored::Colorize;
use tracing::{debug, warn};

use crate::cli::AzureArgs;
use crate::error::CliError;
use crate::utils::resolve_token;

/// Merge the config file with the command-line flags. Flags win.
pub fn build_config(args: &AzureArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(base_url) = &args.base_url {
        config.base_url = Some(base_url.clone());
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(style) = args.attachment_links {
        config.attachment_links = style.into();
    }
    if let Some(naming) = args.attachment_naming {
        config.attachment_naming = naming.into();
    }
    config.headers.extend(args.headers.iter().cloned());

    if config.base_url.is_none() {
        return Err(CliError::usage(anyhow::anyhow!(
            "A base URL is required: pass --base-url, set CFMD_BASE_URL or add base_url to the config file"
        ))
        .into());
    }
    config.validate().map_err(CliError::usage)?;
    Ok(config)
}

/// Export one space into the Azure wiki layout.
pub async fn convert_azure(args: AzureArgs, quiet: bool) -> Result<()> {
    let config = build_config(&args)?;
    debug!(
        "Exporting from {} into {}",
        config.base_url.as_deref().unwrap_or_default(),
        config.output_dir.display()
    );

    let token = resolve_token(args.token, args.user.as_deref())?;
    let credentials = Credentials::from_parts(args.user, token);

    let exporter = Exporter::new(config, &credentials)?;
    let summary = exporter
        .run(&args.space)
        .await
        .with_context(|| format!("Failed to export space '{}'", args.space))?;

    for (path, err) in &summary.resolve.failures {
        warn!("Links not resolved in {}: {}", path.display(), err);
    }
    if !quiet {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &ExportSummary) {
    println!(
        "{} Exported space {} ({}) to {}",
        "✓".green(),
        summary.space_key.bold(),
        summary.space_name,
        summary.root.display().to_string().cyan()
    );
    println!(
        "  {} pages, {} attachments, {} links resolved in {:.1}s",
        summary.crawl.pages_written,
        summary.crawl.attachments_downloaded,
        summary.resolve.links_replaced,
        summary.elapsed.as_secs_f64()
    );
    if summary.crawl.files_overwritten > 0 {
        println!(
            "  {} {} page(s) overwrote a sibling with the same name",
            "!".yellow(),
            summary.crawl.files_overwritten
        );
    }
    if !summary.resolve.is_clean() {
        println!(
            "  {} {} file(s) could not be scanned for links",
            "!".yellow(),
            summary.resolve.failures.len()
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{LinkStyleArg, NamingArg};
    use cfmd_core::{AttachmentLinkStyle, AttachmentNaming};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(config: PathBuf) -> AzureArgs {
        AzureArgs {
            space: "DEMO".into(),
            base_url: None,
            token: None,
            user: None,
            headers: Vec::new(),
            output_dir: None,
            timeout: None,
            attachment_links: None,
            attachment_naming: None,
            config: Some(config),
        }
    }

    #[test]
    fn test_flags_override_config_file() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let file = tmp.path().join("config.toml");
        std::fs::write(
            &file,
            r#"
base_url = "https://file.example.com"
timeout_secs = 5
attachment_naming = "content_hash"

[headers]
X-Team = "file"
X-Keep = "yes"
"#,
        )?;

        let mut args = args(file);
        args.base_url = Some("https://flag.example.com".into());
        args.headers = vec![("X-Team".into(), "flag".into())];
        args.attachment_links = Some(LinkStyleArg::Absolute);
        args.output_dir = Some(tmp.path().join("out"));

        let config = build_config(&args)?;
        assert_eq!(config.base_url.as_deref(), Some("https://flag.example.com"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.attachment_naming, AttachmentNaming::ContentHash);
        assert_eq!(config.attachment_links, AttachmentLinkStyle::Absolute);
        assert_eq!(config.headers.get("X-Team").map(String::as_str), Some("flag"));
        assert_eq!(config.headers.get("X-Keep").map(String::as_str), Some("yes"));
        assert_eq!(config.output_dir, tmp.path().join("out"));
        Ok(())
    }

    #[test]
    fn test_missing_base_url_is_usage_error() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let file = tmp.path().join("config.toml");
        std::fs::write(&file, "timeout_secs = 5\n")?;

        let mut args = args(file);
        args.attachment_naming = Some(NamingArg::Random);
        let err = build_config(&args).unwrap_err();
        assert_eq!(crate::error::exit_code_from_error(&err), 2);
        Ok(())
    }
}
