//! Configuration for an export run.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. **Defaults**: [`Config::default`]
//! 2. **Config file**: TOML, from an explicit path, `CFMD_CONFIG`, or the
//!    platform config directory (`<config_dir>/cfmd/config.toml`) when present
//! 3. **CLI flags**: applied by the caller on the loaded value
//!
//! Credentials are never read from the file: they come from flags, the
//! environment or an interactive prompt.
//!
//! ## Example Configuration File
//!
//! ```toml
//! base_url = "https://wiki.example.com"
//! attachments_dir = "__attachments"
//! attachment_links = "relative"
//! attachment_naming = "random"
//! timeout_secs = 30
//!
//! [headers]
//! "X-Proxy-Token" = "abc123"
//! ```

use crate::{Error, Result};
use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Default name of the flat attachments folder inside the space directory.
pub const DEFAULT_ATTACHMENTS_DIR: &str = "__attachments";

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "CFMD_CONFIG";

/// How relocated attachments are referenced from the Markdown text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentLinkStyle {
    /// `__attachments/<name>`, resolved by the Azure wiki from the wiki root.
    #[default]
    Relative,
    /// Absolute local filesystem path, for viewers that open files in place.
    Absolute,
}

/// How downloaded attachments are named on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentNaming {
    /// Random numeric prefix. Collisions are possible but unlikely.
    #[default]
    Random,
    /// Prefix derived from a SHA-256 of the content. Identical bodies share a
    /// name, so repeated downloads of one attachment collapse into one file.
    ContentHash,
}

/// Settings for one export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wiki base URL, e.g. `https://wiki.example.com` or `https://host/confluence`.
    pub base_url: Option<String>,
    /// Directory in which the `<space-key>` folder is created.
    pub output_dir: PathBuf,
    /// Attachments folder name inside the space folder.
    pub attachments_dir: String,
    /// Link form written for relocated attachments.
    pub attachment_links: AttachmentLinkStyle,
    /// File naming scheme for relocated attachments.
    pub attachment_naming: AttachmentNaming,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Extra static headers attached to every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            output_dir: PathBuf::from("."),
            attachments_dir: DEFAULT_ATTACHMENTS_DIR.to_string(),
            attachment_links: AttachmentLinkStyle::default(),
            attachment_naming: AttachmentNaming::default(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!("cfmd/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from `CFMD_CONFIG` or the platform config directory.
    ///
    /// Falls back to defaults when no file exists. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Self::load_from(Path::new(trimmed));
            }
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config {}: {e}", path.display()))
        })
    }

    /// Platform-specific location of the default config file.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "cfmd", "cfmd")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Base URL without a trailing slash.
    ///
    /// Fails when no base URL is configured or it is not an absolute
    /// `http`/`https` URL.
    pub fn base_url(&self) -> Result<String> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("base URL is required".into()))?;

        let parsed = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{raw}: expected an http or https URL"
            )));
        }

        Ok(raw.trim_end_matches('/').to_string())
    }

    /// Check that the configuration can drive an export.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.attachments_dir.is_empty()
            || self.attachments_dir.contains(['/', '\\'])
            || self.attachments_dir == ".."
        {
            return Err(Error::Config(format!(
                "Invalid attachments directory name '{}'",
                self.attachments_dir
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }

        for name in self.headers.keys() {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("Invalid header name '{name}': {e}")))?;
        }

        Ok(())
    }
}
