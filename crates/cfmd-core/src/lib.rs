//! # cfmd-core
//!
//! Export engine for cfmd: turns a Confluence space into an Azure DevOps wiki
//! folder of Markdown files.
//!
//! ## Architecture
//!
//! An export runs in two phases:
//!
//! - **Crawl**: depth-first walk of the page tree from the space homepage.
//!   Each page is fetched, converted from HTML to Markdown, stripped of remote
//!   attachments (downloaded into one flat folder) and written to disk. The
//!   name every page was written under is recorded in an [`OutputPathMap`].
//! - **Resolve**: once everything is on disk, permalinks between pages are
//!   replaced by the recorded names. Links to pages outside the export are
//!   left alone.
//!
//! Requests are made one at a time, in page order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cfmd_core::{Config, Credentials, Exporter};
//!
//! # async fn demo() -> cfmd_core::Result<()> {
//! let config = Config {
//!     base_url: Some("https://wiki.example.com".into()),
//!     ..Config::default()
//! };
//! let exporter = Exporter::new(config, &Credentials::Bearer("token".into()))?;
//! let summary = exporter.run("DEMO").await?;
//! println!(
//!     "{} pages written to {}",
//!     summary.crawl.pages_written,
//!     summary.root.display()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]. Crawl errors are fatal; link
//! resolution failures are collected in [`ResolveReport`].

/// Attachment download and link rewriting
pub mod attachments;
/// Run configuration
pub mod config;
/// HTML to Markdown conversion
pub mod convert;
/// Depth-first page crawl
pub mod crawl;
/// Error types and result aliases
pub mod error;
/// Two-phase export driver
pub mod export;
/// REST calls for spaces and pages
pub mod fetcher;
/// Page id to output name table
pub mod output_map;
/// Attachment and page-link URL patterns
pub mod patterns;
/// Second-pass permalink resolution
pub mod resolve;
/// Page title to file name mapping
pub mod sanitize;
/// Authenticated HTTP client
pub mod transport;
/// REST API documents
pub mod types;

// Re-export commonly used types
pub use attachments::{AttachmentRelocator, Relocated};
pub use config::{AttachmentLinkStyle, AttachmentNaming, Config};
pub use convert::{HtmdConverter, MarkdownConverter};
pub use crawl::{CrawlOutcome, CrawlStats, Crawler};
pub use error::{Error, Result};
pub use export::{ExportSummary, Exporter};
pub use fetcher::PageFetcher;
pub use output_map::OutputPathMap;
pub use patterns::LinkPatterns;
pub use resolve::{LinkResolver, ResolveReport};
pub use sanitize::sanitize_title;
pub use transport::{Credentials, Transport};
pub use types::{Page, Space};
