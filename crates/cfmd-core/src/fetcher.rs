//! REST calls for spaces and pages.

use crate::transport::Transport;
use crate::types::{Page, Space};
use crate::{Error, Result};
use tracing::{debug, info, instrument};
use url::Url;

/// Expansion requested for every page: exported body and one level of children.
pub const PAGE_EXPAND: &str = "body.export_view,children.page";

/// Fetches [`Space`] and [`Page`] documents from the wiki REST API.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    transport: Transport,
    base_url: String,
}

impl PageFetcher {
    /// Create a fetcher for the API rooted at `base_url` (no trailing slash).
    pub fn new(transport: Transport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Base URL this fetcher was created with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a space by key.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_space(&self, key: &str) -> Result<Space> {
        let url = format!("{}/rest/api/space/{key}", self.base_url);
        Url::parse(&url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        let space: Space = self.transport.get_json(&url).await?;
        info!("Fetched space {} ({})", space.key, space.name);
        Ok(space)
    }

    /// Absolute URL of the space homepage.
    ///
    /// The homepage link is base-relative, so it is appended to the base URL
    /// as-is (this keeps a context path such as `/confluence`).
    pub fn homepage_url(&self, space: &Space) -> Result<String> {
        let link = space.expandable.homepage.trim();
        if link.is_empty() {
            return Err(Error::Decode(format!(
                "space '{}' has no homepage link",
                space.key
            )));
        }
        Ok(format!("{}{link}", self.base_url))
    }

    /// Fetch one page with its body and immediate children.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_page(&self, page_url: &str) -> Result<Page> {
        let url = page_request_url(page_url)?;
        debug!("Requesting {}", url);
        let page: Page = self.transport.get_json(url.as_str()).await?;
        Ok(page)
    }
}

/// Add the page expansion to `page_url`, keeping any existing query pairs.
pub fn page_request_url(page_url: &str) -> Result<Url> {
    let mut url =
        Url::parse(page_url.trim()).map_err(|e| Error::InvalidUrl(format!("{page_url}: {e}")))?;
    url.query_pairs_mut().append_pair("expand", PAGE_EXPAND);
    Ok(url)
}
