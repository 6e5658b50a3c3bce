//! Page id to output name table shared by the two export phases.
//!
//! The crawl owns the map mutably and inserts one entry per written page.
//! When the crawl finishes the map is moved into the link resolver, which only
//! reads it. There is no way to get it back for writing.

use std::collections::HashMap;

/// `page id -> sanitized output name` (no directory, no extension).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPathMap {
    entries: HashMap<String, String>,
}

impl OutputPathMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the output name of a page. Returns the previous name if the id
    /// was already present.
    pub fn insert(&mut self, page_id: impl Into<String>, name: impl Into<String>) -> Option<String> {
        self.entries.insert(page_id.into(), name.into())
    }

    /// Output name of a page.
    pub fn get(&self, page_id: &str) -> Option<&str> {
        self.entries.get(page_id).map(String::as_str)
    }

    /// True if the page has been written.
    pub fn contains(&self, page_id: &str) -> bool {
        self.entries.contains_key(page_id)
    }

    /// Number of pages recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no page has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(page id, output name)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OutputPathMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
