//! Second pass: rewrite permalinks between pages.
//!
//! A page can link to a page the crawl has not written yet, so links are only
//! resolved once the whole tree is on disk. Every file under the export root
//! is scanned, except the attachments folder, and each permalink whose page id
//! is known is replaced by the bare output name of that page. Ids that are not
//! in the map stay exactly as they were.
//!
//! Unlike the crawl, this pass is best-effort. A file that cannot be read or
//! written is reported and skipped.

use crate::output_map::OutputPathMap;
use crate::patterns::{LinkPatterns, PAGE_ID_GROUP};
use crate::{Error, Result};
use regex::Captures;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a resolve pass.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Files read.
    pub files_scanned: usize,
    /// Files written back.
    pub files_rewritten: usize,
    /// Permalinks replaced by a local name.
    pub links_replaced: usize,
    /// Permalinks left alone because the target page was not exported.
    pub links_unresolved: usize,
    /// Files or directories that could not be processed.
    pub failures: Vec<(PathBuf, Error)>,
}

impl ResolveReport {
    /// True when every file was processed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rewrites page permalinks using the names recorded by the crawl.
#[derive(Debug)]
pub struct LinkResolver {
    map: OutputPathMap,
    patterns: LinkPatterns,
    attachments_dir: String,
}

impl LinkResolver {
    /// Create a resolver. `attachments_dir` is the folder name, relative to
    /// the export root, that is never scanned.
    pub fn new(map: OutputPathMap, patterns: LinkPatterns, attachments_dir: impl Into<String>) -> Self {
        Self {
            map,
            patterns,
            attachments_dir: attachments_dir.into(),
        }
    }

    /// Names the resolver will substitute.
    pub const fn output_map(&self) -> &OutputPathMap {
        &self.map
    }

    /// Rewrite every file under `root`.
    pub fn resolve_all(&self, root: &Path) -> ResolveReport {
        let mut report = ResolveReport::default();
        let skip = root.join(&self.attachments_dir);

        let mut files = Vec::new();
        collect_files(root, &skip, &mut files, &mut report);
        files.sort();

        for file in files {
            report.files_scanned += 1;
            if let Err(e) = self.resolve_file(&file, &mut report) {
                warn!("Failed to resolve links in {}: {}", file.display(), e);
                report.failures.push((file, e));
            }
        }

        info!(
            "Resolved {} links in {} files ({} left unresolved)",
            report.links_replaced, report.files_rewritten, report.links_unresolved
        );
        report
    }

    /// Replace known permalinks in `text`. Returns the new text with the
    /// number of replaced and unresolved links.
    pub fn resolve_text(&self, text: &str) -> (String, usize, usize) {
        let mut replaced = 0;
        let mut unresolved = 0;
        let out = self
            .patterns
            .page_link()
            .replace_all(text, |caps: &Captures<'_>| {
                let id = caps.name(PAGE_ID_GROUP).map_or("", |m| m.as_str());
                match self.map.get(id) {
                    Some(name) => {
                        replaced += 1;
                        name.to_owned()
                    },
                    None => {
                        unresolved += 1;
                        caps[0].to_owned()
                    },
                }
            });
        (out.into_owned(), replaced, unresolved)
    }

    fn resolve_file(&self, file: &Path, report: &mut ResolveReport) -> Result<()> {
        let text = fs::read_to_string(file)?;
        let (resolved, replaced, unresolved) = self.resolve_text(&text);
        fs::write(file, resolved)?;

        debug!("{}: {} replaced, {} unresolved", file.display(), replaced, unresolved);
        report.files_rewritten += 1;
        report.links_replaced += replaced;
        report.links_unresolved += unresolved;
        Ok(())
    }
}

fn collect_files(dir: &Path, skip: &Path, files: &mut Vec<PathBuf>, report: &mut ResolveReport) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to list {}: {}", dir.display(), e);
            report.failures.push((dir.to_path_buf(), Error::Io(e)));
            return;
        },
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                report.failures.push((dir.to_path_buf(), Error::Io(e)));
                continue;
            },
        };
        if path.starts_with(skip) {
            continue;
        }
        if path.is_dir() {
            collect_files(&path, skip, files, report);
        } else if path.is_file() {
            files.push(path);
        }
    }
}
