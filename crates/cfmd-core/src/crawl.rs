//! Depth-first crawl of the page tree.
//!
//! Starting from one page URL, every page is fetched, converted, stripped of
//! remote attachments and written to disk before its children are visited.
//! Children are visited strictly in API order, one at a time. The walk keeps
//! an explicit stack instead of recursing, which gives the same pre-order as
//! a recursive walk.
//!
//! Layout produced for a page titled `T` visited in directory `D`:
//!
//! - without children: `D/T.md`
//! - with children: `D/T/T.md`, children are visited in `D/T`
//!
//! Links between pages are left untouched here; the crawl only records which
//! name each page id was written under, for [`crate::resolve::LinkResolver`].

use crate::attachments::AttachmentRelocator;
use crate::convert::{HtmdConverter, MarkdownConverter};
use crate::fetcher::PageFetcher;
use crate::output_map::OutputPathMap;
use crate::sanitize::sanitize_title;
use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counters collected during a crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Markdown files written.
    pub pages_written: usize,
    /// Directories created for pages with children.
    pub directories_created: usize,
    /// Attachment downloads written to disk.
    pub attachments_downloaded: usize,
    /// Page files that replaced an existing file with the same name.
    pub files_overwritten: usize,
}

/// What the crawl hands over to the link resolver.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// One entry per written page.
    pub map: OutputPathMap,
    /// Counters.
    pub stats: CrawlStats,
}

/// Walks a page tree and materializes it as Markdown files.
pub struct Crawler {
    fetcher: PageFetcher,
    relocator: AttachmentRelocator,
    converter: Arc<dyn MarkdownConverter>,
    map: OutputPathMap,
    stats: CrawlStats,
}

impl Crawler {
    /// Create a crawler using the default `htmd` converter.
    pub fn new(fetcher: PageFetcher, relocator: AttachmentRelocator) -> Self {
        Self {
            fetcher,
            relocator,
            converter: Arc::new(HtmdConverter),
            map: OutputPathMap::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Replace the HTML to Markdown converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn MarkdownConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Output names recorded so far.
    pub const fn output_map(&self) -> &OutputPathMap {
        &self.map
    }

    /// Counters so far.
    pub const fn stats(&self) -> CrawlStats {
        self.stats
    }

    /// Crawl the tree rooted at `page_url`, writing into `output_dir`.
    ///
    /// The first error stops the walk and is returned as is. Files written
    /// before the failure are left in place.
    pub async fn visit(&mut self, page_url: &str, output_dir: &Path) -> Result<()> {
        let mut pending = vec![(page_url.to_owned(), output_dir.to_path_buf())];

        while let Some((url, dir)) = pending.pop() {
            let children = self.materialize(&url, &dir).await?;
            // Reversed so the first child is popped first.
            pending.extend(children.into_iter().rev());
        }

        Ok(())
    }

    /// Finish the crawl and hand the recorded names to the next phase.
    pub fn finish(self) -> CrawlOutcome {
        CrawlOutcome {
            map: self.map,
            stats: self.stats,
        }
    }

    /// Fetch, convert and write one page. Returns its children with the
    /// directory they must be written into.
    async fn materialize(&mut self, url: &str, output_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let page = self.fetcher.fetch_page(url).await?;
        let name = sanitize_title(&page.title);
        let has_children = page.has_children();
        info!("Processing page {} ({}): {}", page.id, page.title, url);

        let target = if has_children {
            let dir = output_dir.join(&name);
            create_page_dir(&dir).await?;
            self.stats.directories_created += 1;
            dir
        } else {
            output_dir.to_path_buf()
        };

        let markdown = self.converter.convert(&page.title, page.body_html())?;
        let relocated = self.relocator.relocate(&markdown, &page).await?;
        self.stats.attachments_downloaded += relocated.files.len();

        let file = target.join(format!("{name}.md"));
        if tokio::fs::try_exists(&file).await.unwrap_or(false) {
            warn!(
                "Page {} ({}) overwrites existing file {}",
                page.id,
                page.title,
                file.display()
            );
            self.stats.files_overwritten += 1;
        }
        tokio::fs::write(&file, relocated.markdown.as_bytes())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to write page {}: {e}", file.display()),
                ))
            })?;
        debug!("Wrote {} bytes to {}", relocated.markdown.len(), file.display());
        self.stats.pages_written += 1;

        self.map.insert(page.id.clone(), name);

        if !has_children {
            return Ok(Vec::new());
        }
        Ok(page
            .child_links()
            .map(|link| (link.to_owned(), target.clone()))
            .collect())
    }
}

async fn create_page_dir(dir: &Path) -> Result<()> {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(Error::DirectoryExists(dir.to_path_buf()))
        },
        Err(e) => Err(Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to create directory {}: {e}", dir.display()),
        ))),
    }
}
