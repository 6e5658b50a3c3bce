//! URL shapes recognised inside converted Markdown.
//!
//! The crawl and resolve passes only ever ask two questions of a page's text:
//! where are the attachment downloads, and where are the permalinks to other
//! pages. Both answers come from [`LinkPatterns`], so a different API version
//! or source wiki only needs a different pair of regexes.

use crate::Result;
use regex::Regex;

/// Name of the capture group holding the page id in [`LinkPatterns::page_link`].
pub const PAGE_ID_GROUP: &str = "id";

/// Attachment and page-link matchers.
#[derive(Debug, Clone)]
pub struct LinkPatterns {
    attachment: Regex,
    page_link: Regex,
}

impl LinkPatterns {
    /// Patterns for the Server/Data Center REST API rooted at `base_url`.
    ///
    /// - attachments: `[<base>]/download/attachments/...api=v2`, absolute,
    ///   base-relative or prefixed with the base URL's own path
    /// - page links: `<base>/pages/viewpage.action?pageId=<digits>`
    ///
    /// An attachment match stops at the first `api=v2` and never crosses
    /// whitespace or a Markdown link delimiter.
    pub fn for_base_url(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let base = regex::escape(trimmed);
        let prefix = match context_path(trimmed) {
            Some(path) => format!("(?:{base}|{})", regex::escape(path)),
            None => format!("(?:{base})"),
        };
        let attachment = Regex::new(&format!(
            r#"{prefix}?/download/attachments/[^\s()\[\]<>"']*?api=v2"#
        ))?;
        let page_link = Regex::new(&format!(
            r"{base}/pages/viewpage\.action\?pageId=(?P<{PAGE_ID_GROUP}>\d+)"
        ))?;
        Ok(Self {
            attachment,
            page_link,
        })
    }

    /// Custom patterns. `page_link` must define a capture group named `id`.
    pub fn new(attachment: Regex, page_link: Regex) -> Result<Self> {
        if !page_link
            .capture_names()
            .any(|name| name == Some(PAGE_ID_GROUP))
        {
            return Err(crate::Error::Config(format!(
                "page link pattern '{page_link}' has no capture group named '{PAGE_ID_GROUP}'"
            )));
        }
        Ok(Self {
            attachment,
            page_link,
        })
    }

    /// Matcher for attachment download URLs.
    pub const fn attachment(&self) -> &Regex {
        &self.attachment
    }

    /// Matcher for "view page by id" permalinks.
    pub const fn page_link(&self) -> &Regex {
        &self.page_link
    }

    /// All attachment references in `text`, in order, duplicates included.
    pub fn attachment_refs<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.attachment.find_iter(text).map(|m| m.as_str()).collect()
    }
}

/// Path part of a base URL such as `https://host/confluence`, if any.
fn context_path(base_url: &str) -> Option<&str> {
    let after_scheme = base_url.split_once("://").map_or(base_url, |(_, rest)| rest);
    after_scheme
        .find('/')
        .map(|slash| &after_scheme[slash..])
        .filter(|path| path.len() > 1)
}
