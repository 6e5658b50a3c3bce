//! Space export driver.
//!
//! Runs the two phases back to back: the crawl writes every page and
//! attachment, then the resolver rewrites links between pages. The crawl's
//! output map is moved into the resolver, so it can no longer change once
//! resolution starts.

use crate::attachments::AttachmentRelocator;
use crate::config::Config;
use crate::convert::MarkdownConverter;
use crate::crawl::{CrawlStats, Crawler};
use crate::fetcher::PageFetcher;
use crate::patterns::LinkPatterns;
use crate::resolve::{LinkResolver, ResolveReport};
use crate::transport::{Credentials, Transport};
use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Result of a completed export.
#[derive(Debug)]
pub struct ExportSummary {
    /// Space key that was exported.
    pub space_key: String,
    /// Space display name.
    pub space_name: String,
    /// `<output_dir>/<space key>`.
    pub root: PathBuf,
    /// Crawl counters.
    pub crawl: CrawlStats,
    /// Link resolution outcome.
    pub resolve: ResolveReport,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

/// Exports spaces into Azure wiki folders.
pub struct Exporter {
    config: Config,
    base_url: String,
    transport: Transport,
    patterns: LinkPatterns,
    converter: Option<Arc<dyn MarkdownConverter>>,
}

impl Exporter {
    /// Build an exporter. The configuration is validated here.
    pub fn new(config: Config, credentials: &Credentials) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?;
        let transport = Transport::new(&config, credentials)?;
        let patterns = LinkPatterns::for_base_url(&base_url)?;
        Ok(Self {
            config,
            base_url,
            transport,
            patterns,
            converter: None,
        })
    }

    /// Use different attachment and page-link patterns.
    #[must_use]
    pub fn with_patterns(mut self, patterns: LinkPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Use a different HTML to Markdown converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn MarkdownConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Folder a space is exported into.
    pub fn space_root(&self, space_key: &str) -> PathBuf {
        self.config.output_dir.join(space_key)
    }

    /// Export one space.
    ///
    /// Fails if the space folder already exists. Crawl errors abort the run
    /// and leave whatever was written so far; resolve errors are only
    /// reported in [`ExportSummary::resolve`].
    #[instrument(level = "debug", skip(self))]
    pub async fn run(&self, space_key: &str) -> Result<ExportSummary> {
        let started = Instant::now();
        let key = space_key.trim();
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(Error::Config(format!("Invalid space key '{space_key}'")));
        }

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let root = self.space_root(key);
        create_exclusive(&root).await?;
        let attachments = root.join(&self.config.attachments_dir);
        create_exclusive(&attachments).await?;
        info!("Exporting space {} into {}", key, root.display());

        let fetcher = PageFetcher::new(self.transport.clone(), self.base_url.clone());
        let space = fetcher.fetch_space(key).await?;
        let homepage = fetcher.homepage_url(&space)?;

        let relocator = AttachmentRelocator::new(
            self.transport.clone(),
            self.base_url.clone(),
            self.patterns.clone(),
            attachments,
        )
        .with_link_style(self.config.attachment_links)
        .with_naming(self.config.attachment_naming);

        let mut crawler = Crawler::new(fetcher, relocator);
        if let Some(converter) = &self.converter {
            crawler = crawler.with_converter(Arc::clone(converter));
        }
        crawler.visit(&homepage, &root).await?;
        let outcome = crawler.finish();
        info!(
            "Crawl finished: {} pages, {} attachments",
            outcome.stats.pages_written, outcome.stats.attachments_downloaded
        );

        let resolver = LinkResolver::new(
            outcome.map,
            self.patterns.clone(),
            self.config.attachments_dir.clone(),
        );
        let resolve_root = root.clone();
        let resolve = tokio::task::spawn_blocking(move || resolver.resolve_all(&resolve_root))
            .await
            .map_err(|e| Error::Other(format!("Link resolution task failed: {e}")))?;

        Ok(ExportSummary {
            space_key: key.to_string(),
            space_name: space.name,
            root,
            crawl: outcome.stats,
            resolve,
            elapsed: started.elapsed(),
        })
    }
}

async fn create_exclusive(dir: &Path) -> Result<()> {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(Error::DirectoryExists(dir.to_path_buf()))
        },
        Err(e) => Err(Error::Io(e)),
    }
}
