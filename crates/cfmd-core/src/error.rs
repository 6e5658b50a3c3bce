//! Error types and handling for cfmd-core operations.
//!
//! Every fallible step of the export returns [`Result<T, Error>`]. The engine
//! never terminates the process itself: the caller (normally the CLI) decides
//! what a failure means.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: writing pages and attachments, creating directories
//! - **Network Errors**: connection failures and non-2xx responses
//! - **Decode Errors**: malformed JSON, unparseable URLs
//! - **Conversion Errors**: HTML to Markdown conversion failures
//! - **Configuration Errors**: invalid config files, headers or patterns
//!
//! ## Fatal vs. best-effort
//!
//! During the crawl every error is fatal and bubbles up unchanged. The link
//! resolver is the only place that swallows errors: it records them per file
//! in [`crate::resolve::ResolveReport`] and moves on.
//!
//! ```rust
//! use cfmd_core::Error;
//!
//! let err = Error::HttpStatus {
//!     url: "https://wiki.example.com/rest/api/space/DEMO".into(),
//!     status: 404,
//!     reason: "Not Found".into(),
//! };
//! assert_eq!(err.category(), "network");
//! assert!(!err.is_recoverable());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cfmd-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers writing page files and attachments and reading files back during
    /// link resolution. The underlying `std::io::Error` is preserved.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure (DNS, connection refused, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote API answered with a non-2xx status.
    #[error("HTTP error while fetching '{url}': {status} \"{reason}\"")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase, empty when the status has none.
        reason: String,
    },

    /// Response body could not be decoded into the expected document.
    #[error("Decode error: {0}")]
    Decode(String),

    /// URL is malformed or could not be joined with the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML to Markdown conversion failed.
    #[error("Conversion failed for page '{page}': {reason}")]
    Convert {
        /// Title of the page whose body failed to convert.
        page: String,
        /// Converter message.
        reason: String,
    },

    /// A directory for a page with children already exists.
    ///
    /// Directory collisions are never merged: two sibling pages whose titles
    /// sanitize to the same name abort the crawl here.
    #[error("Directory already exists: {}", .0.display())]
    DirectoryExists(PathBuf),

    /// A link or attachment pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl Error {
    /// Check if the error might succeed on a later attempt.
    ///
    /// The export itself never retries; this is exposed so callers that wrap
    /// the engine can decide whether a rerun is worth it.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// - `"io"` - File system operations
    /// - `"network"` - Transport failures and non-2xx responses
    /// - `"timeout"` - Requests that exceeded the configured timeout
    /// - `"decode"` - Malformed JSON
    /// - `"invalid_url"` - URL parsing and joining
    /// - `"convert"` - HTML to Markdown conversion
    /// - `"filesystem"` - Output layout conflicts
    /// - `"config"` - Configuration, headers and patterns
    /// - `"other"` - Uncategorized errors
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(e) if e.is_timeout() => "timeout",
            Self::Network(_) | Self::HttpStatus { .. } => "network",
            Self::Decode(_) => "decode",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Convert { .. } => "convert",
            Self::DirectoryExists(_) => "filesystem",
            Self::Pattern(_) | Self::Config(_) => "config",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
