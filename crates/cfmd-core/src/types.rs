//! Documents returned by the wiki REST API.
//!
//! Only the fields the export needs are modelled; everything else in the JSON
//! is ignored by serde. Pages are never persisted as structured data: they are
//! decoded, turned into Markdown and dropped.

use serde::{Deserialize, Serialize};

/// One wiki page as returned by `GET <page>?expand=body.export_view,children.page`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Stable identifier, unique within the space.
    pub id: String,
    /// Content type, `"page"` for regular pages.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Lifecycle status such as `"current"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable title.
    pub title: String,
    /// Exported body.
    #[serde(default)]
    pub body: PageBody,
    /// Immediate children, absent unless the expansion was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<PageChildren>,
}

/// Body wrapper of a [`Page`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBody {
    /// The `export_view` representation.
    #[serde(default)]
    pub export_view: ExportView,
}

/// Rendered HTML of a page body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportView {
    /// Raw HTML.
    #[serde(default)]
    pub value: String,
}

/// `children` expansion of a [`Page`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageChildren {
    /// Child pages, `None` when the API omits the key.
    #[serde(default)]
    pub page: Option<ChildPages>,
}

/// Paged list of child references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildPages {
    /// Child references in API order.
    #[serde(default)]
    pub results: Vec<ChildRef>,
}

/// Reference to a child page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    /// Navigation links of the child.
    #[serde(rename = "_links", default)]
    pub links: SelfLinks,
}

/// `_links` block carrying the REST self-link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfLinks {
    /// Absolute REST URL of the resource.
    #[serde(rename = "self", default)]
    pub self_link: String,
}

impl Page {
    /// Exported body HTML.
    pub fn body_html(&self) -> &str {
        &self.body.export_view.value
    }

    /// True when the children list is present and non-empty.
    pub fn has_children(&self) -> bool {
        self.children
            .as_ref()
            .and_then(|c| c.page.as_ref())
            .is_some_and(|p| !p.results.is_empty())
    }

    /// Child self-links in the order the API returned them.
    pub fn child_links(&self) -> impl Iterator<Item = &str> {
        self.children
            .iter()
            .filter_map(|c| c.page.as_ref())
            .flat_map(|p| p.results.iter())
            .map(|r| r.links.self_link.as_str())
    }
}

/// A space as returned by `GET <base>/rest/api/space/{key}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Numeric space id.
    #[serde(default)]
    pub id: i64,
    /// Space key, e.g. `DEMO`.
    #[serde(default)]
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Space type such as `"global"`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<String>,
    /// Links to expandable sub-resources.
    #[serde(rename = "_expandable", default)]
    pub expandable: SpaceExpandable,
    /// Navigation links.
    #[serde(rename = "_links", default)]
    pub links: SpaceLinks,
}

/// `_expandable` block of a [`Space`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceExpandable {
    /// Base-relative REST link to the homepage, e.g. `/rest/api/content/100`.
    #[serde(default)]
    pub homepage: String,
}

/// `_links` block of a [`Space`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceLinks {
    /// Browser link.
    #[serde(default)]
    pub webui: String,
    /// REST self-link.
    #[serde(rename = "self", default)]
    pub self_link: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PAGE_WITH_CHILDREN: &str = r#"{
        "id": "200",
        "type": "page",
        "status": "current",
        "title": "Parent",
        "body": {"export_view": {"value": "<p>parent</p>", "representation": "export_view"}},
        "children": {"page": {"results": [
            {"id": "201", "_links": {"self": "https://wiki.example.com/rest/api/content/201"}},
            {"id": "202", "_links": {"self": "https://wiki.example.com/rest/api/content/202"}}
        ], "size": 2}}
    }"#;

    #[test]
    fn test_page_decodes_children_in_order() {
        let page: Page = serde_json::from_str(PAGE_WITH_CHILDREN).unwrap();
        assert_eq!(page.id, "200");
        assert_eq!(page.kind.as_deref(), Some("page"));
        assert_eq!(page.body_html(), "<p>parent</p>");
        assert!(page.has_children());
        let links: Vec<_> = page.child_links().collect();
        assert_eq!(
            links,
            vec![
                "https://wiki.example.com/rest/api/content/201",
                "https://wiki.example.com/rest/api/content/202",
            ]
        );
    }

    #[test]
    fn test_page_without_children_key() {
        let page: Page = serde_json::from_str(
            r#"{"id": "100", "title": "Home", "body": {"export_view": {"value": "<p>hi</p>"}}}"#,
        )
        .unwrap();
        assert!(!page.has_children());
        assert_eq!(page.child_links().count(), 0);
    }

    #[test]
    fn test_page_with_empty_or_missing_child_results() {
        let empty: Page = serde_json::from_str(
            r#"{"id": "1", "title": "T", "children": {"page": {"results": []}}}"#,
        )
        .unwrap();
        assert!(!empty.has_children());

        let no_page: Page =
            serde_json::from_str(r#"{"id": "1", "title": "T", "children": {}}"#).unwrap();
        assert!(!no_page.has_children());
    }

    #[test]
    fn test_space_decodes_homepage_link() {
        let space: Space = serde_json::from_str(
            r#"{
                "id": 98305,
                "key": "DEMO",
                "name": "Demo Space",
                "type": "global",
                "_expandable": {"homepage": "/rest/api/content/100", "settings": "/x"},
                "_links": {"webui": "/display/DEMO", "self": "https://wiki.example.com/rest/api/space/DEMO"}
            }"#,
        )
        .unwrap();
        assert_eq!(space.key, "DEMO");
        assert_eq!(space.expandable.homepage, "/rest/api/content/100");
        assert_eq!(space.links.webui, "/display/DEMO");
    }

    #[test]
    fn test_malformed_page_is_rejected() {
        assert!(serde_json::from_str::<Page>(r#"{"title": "no id"}"#).is_err());
    }
}
