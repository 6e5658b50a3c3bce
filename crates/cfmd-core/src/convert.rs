//! HTML to Markdown conversion.
//!
//! The crawl treats conversion as a pure function of the body HTML. The
//! [`MarkdownConverter`] trait is the seam; [`HtmdConverter`] is the default.

use crate::{Error, Result};
use htmd::{Element, HtmlToMarkdown};
use std::sync::LazyLock;

// Cells and rows are fenced with control characters while their children are
// converted; the table handler turns them into pipe-table syntax.
const CELL: char = '\u{1F}';
const ROW: char = '\u{1E}';
const HEADER_CELL: char = 'H';
const DATA_CELL: char = 'D';

static CONVERTER: LazyLock<HtmlToMarkdown> = LazyLock::new(|| {
    HtmlToMarkdown::builder()
        .add_handler(vec!["th", "td"], cell_handler)
        .add_handler(vec!["tr"], row_handler)
        .add_handler(vec!["table"], table_handler)
        .build()
});

/// Converts an exported page body into Markdown.
pub trait MarkdownConverter: Send + Sync {
    /// Convert `html`. `title` is only used to give errors context.
    fn convert(&self, title: &str, html: &str) -> Result<String>;
}

/// Converter backed by the `htmd` crate.
///
/// Tables come out as GitHub-flavored pipe tables, with the first row as the
/// header. Multi-line cell content is joined with `<br>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmdConverter;

impl MarkdownConverter for HtmdConverter {
    fn convert(&self, title: &str, html: &str) -> Result<String> {
        CONVERTER.convert(html).map_err(|e| Error::Convert {
            page: title.to_string(),
            reason: e.to_string(),
        })
    }
}

#[allow(clippy::needless_pass_by_value)]
fn cell_handler(element: Element) -> Option<String> {
    let kind = if element.tag == "th" {
        HEADER_CELL
    } else {
        DATA_CELL
    };
    Some(format!("{CELL}{kind}{}{CELL}", element.content))
}

#[allow(clippy::needless_pass_by_value)]
fn row_handler(element: Element) -> Option<String> {
    Some(format!("{ROW}{}{ROW}", element.content))
}

#[allow(clippy::needless_pass_by_value)]
fn table_handler(element: Element) -> Option<String> {
    let rows: Vec<Vec<String>> = fenced(element.content, ROW)
        .map(|row| {
            fenced(row, CELL)
                .map(|cell| {
                    let text = cell
                        .strip_prefix(HEADER_CELL)
                        .or_else(|| cell.strip_prefix(DATA_CELL))
                        .unwrap_or(cell);
                    table_cell(text)
                })
                .collect()
        })
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Some(String::new());
    }

    let mut out = String::from("\n\n");
    for (index, row) in rows.iter().enumerate() {
        out.push_str(&table_row(row, width));
        if index == 0 {
            out.push_str(&table_row(&vec!["---".to_string(); width], width));
        }
    }
    out.push('\n');
    Some(out)
}

/// Pieces of `text` enclosed between pairs of `fence`.
fn fenced(text: &str, fence: char) -> impl Iterator<Item = &str> {
    text.split(fence).skip(1).step_by(2)
}

fn table_cell(markdown: &str) -> String {
    markdown
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("<br>")
        .replace('|', "\\|")
}

fn table_row(cells: &[String], width: usize) -> String {
    let mut line = String::from("|");
    for index in 0..width {
        line.push(' ');
        line.push_str(cells.get(index).map_or("", String::as_str));
        line.push_str(" |");
    }
    line.push('\n');
    line
}

impl<F> MarkdownConverter for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn convert(&self, _title: &str, html: &str) -> Result<String> {
        self(html)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph() {
        let md = HtmdConverter.convert("Home", "<p>hi</p>").unwrap();
        assert_eq!(md.trim(), "hi");
    }

    #[test]
    fn test_heading_and_link() {
        let md = HtmdConverter
            .convert(
                "Doc",
                r#"<h1>Title</h1><p>See <a href="https://wiki.example.com/pages/viewpage.action?pageId=7">other</a></p>"#,
            )
            .unwrap();
        assert!(md.contains("# Title"));
        assert!(md.contains("[other](https://wiki.example.com/pages/viewpage.action?pageId=7)"));
    }

    #[test]
    fn test_image_keeps_source_url() {
        let md = HtmdConverter
            .convert(
                "Img",
                r#"<p><img src="/download/attachments/1/a.png?api=v2" alt="a"></p>"#,
            )
            .unwrap();
        assert!(md.contains("/download/attachments/1/a.png?api=v2"));
    }

    #[test]
    fn test_table_becomes_pipe_table() {
        let md = HtmdConverter
            .convert(
                "Grid",
                "<table><tbody><tr><th>A</th><th>B</th></tr>\
                 <tr><td>1</td><td>2</td></tr></tbody></table>",
            )
            .unwrap();
        let lines: Vec<&str> = md.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines, vec!["| A | B |", "| --- | --- |", "| 1 | 2 |"], "{md}");
    }

    #[test]
    fn test_table_cells_keep_inline_markdown_on_one_line() {
        let md = HtmdConverter
            .convert(
                "Grid",
                r#"<p>before</p>
                <table>
                  <tr><td><strong>x</strong></td><td><p>one</p><p>two</p></td><td>a|b</td></tr>
                  <tr><td>short</td></tr>
                </table>
                <p>after</p>"#,
            )
            .unwrap();
        assert!(md.contains("| **x** | one<br>two | a\\|b |"), "{md}");
        assert!(md.contains("| --- | --- | --- |"), "{md}");
        assert!(md.contains("| short |  |  |"), "{md}");
        assert!(md.starts_with("before"), "{md}");
        assert!(md.trim_end().ends_with("after"), "{md}");
    }

    #[test]
    fn test_closure_converter() {
        let upper = |html: &str| -> Result<String> { Ok(html.to_uppercase()) };
        assert_eq!(upper.convert("t", "<b>x</b>").unwrap(), "<B>X</B>");

        let failing = |_: &str| -> Result<String> {
            Err(Error::Convert {
                page: "t".into(),
                reason: "nope".into(),
            })
        };
        assert!(failing.convert("t", "").is_err());
    }
}
