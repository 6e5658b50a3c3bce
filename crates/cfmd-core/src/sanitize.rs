//! Page title to file name mapping for the Azure DevOps wiki.
//!
//! Azure wiki pages are files whose names double as page titles, so a few
//! characters must be escaped and spaces become hyphens. See
//! <https://learn.microsoft.com/en-gb/azure/devops/project/wiki/wiki-file-structure#file-naming-conventions>.
//!
//! The rules are applied in order, each one to the output of the previous
//! one. Hyphens are escaped before spaces are turned into hyphens, so a
//! literal `-` and a space stay distinguishable.
//!
//! Sanitized names are not deduplicated: two sibling pages whose titles map to
//! the same name write to the same file and the later one wins.

/// Ordered literal substitutions.
const AZURE_REPLACEMENTS: &[(&str, &str)] = &[
    ("/", "__"),
    (":", "%3A"),
    ("<", "%3C"),
    (">", "%3E"),
    ("*", "%2A"),
    ("?", "%3F"),
    ("|", "%7C"),
    ("-", "%2D"),
    ("\"", "%22"),
    (" ", "-"),
];

/// Map a page title to a name that is safe as an Azure wiki file name.
pub fn sanitize_title(title: &str) -> String {
    AZURE_REPLACEMENTS
        .iter()
        .fold(title.to_owned(), |acc, (from, to)| acc.replace(from, to))
}
