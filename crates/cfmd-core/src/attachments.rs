//! Download of attachments referenced from converted pages.
//!
//! Every attachment URL found in a page's Markdown is fetched, written into
//! the one flat attachments folder of the export, and the URL in the text is
//! replaced with a link to the local copy. Nothing is memoized: an attachment
//! referenced twice is downloaded twice.

use crate::config::{AttachmentLinkStyle, AttachmentNaming};
use crate::patterns::LinkPatterns;
use crate::transport::Transport;
use crate::types::Page;
use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Length of the content-hash prefix used by [`AttachmentNaming::ContentHash`].
const HASH_PREFIX_LEN: usize = 16;

/// Result of relocating one page's attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relocated {
    /// Markdown with attachment URLs rewritten.
    pub markdown: String,
    /// Files written, in reference order.
    pub files: Vec<PathBuf>,
}

/// Fetches attachments and rewrites their references.
#[derive(Debug, Clone)]
pub struct AttachmentRelocator {
    transport: Transport,
    base_url: String,
    patterns: LinkPatterns,
    dir: PathBuf,
    link_style: AttachmentLinkStyle,
    naming: AttachmentNaming,
}

impl AttachmentRelocator {
    /// Create a relocator writing into `dir`, which must already exist.
    pub fn new(
        transport: Transport,
        base_url: impl Into<String>,
        patterns: LinkPatterns,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            patterns,
            dir: dir.into(),
            link_style: AttachmentLinkStyle::default(),
            naming: AttachmentNaming::default(),
        }
    }

    /// Choose how rewritten links look.
    #[must_use]
    pub const fn with_link_style(mut self, style: AttachmentLinkStyle) -> Self {
        self.link_style = style;
        self
    }

    /// Choose how downloaded files are named.
    #[must_use]
    pub const fn with_naming(mut self, naming: AttachmentNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Download every attachment referenced in `markdown` and point the
    /// references at the local copies.
    ///
    /// Any fetch or write failure aborts the whole page.
    pub async fn relocate(&self, markdown: &str, page: &Page) -> Result<Relocated> {
        let refs: Vec<String> = self
            .patterns
            .attachment_refs(markdown)
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut out = Relocated {
            markdown: markdown.to_owned(),
            files: Vec::with_capacity(refs.len()),
        };

        for reference in refs {
            let url = self.absolute_url(&reference)?;
            debug!(page = %page.title, %url, "Downloading attachment");

            let body = self.transport.get_bytes(url.as_str()).await?;
            let name = attachment_file_name(&url, &body, self.naming);
            let target = self.dir.join(&name);
            tokio::fs::write(&target, &body).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to write attachment {}: {e}", target.display()),
                ))
            })?;
            info!("Saved attachment {} ({} bytes)", target.display(), body.len());

            let link = self.link_for(&name, &target)?;
            out.markdown = out.markdown.replace(&reference, &link);
            out.files.push(target);
        }

        Ok(out)
    }

    fn absolute_url(&self, reference: &str) -> Result<Url> {
        let trimmed = reference.trim();
        if trimmed.starts_with("http") {
            return parse_url(trimmed);
        }
        let base = parse_url(&self.base_url)?;
        let context = base.path().trim_end_matches('/');
        // `/confluence/download/...` already carries the base URL's path.
        if !context.is_empty() && trimmed.starts_with(&format!("{context}/")) {
            return base
                .join(trimmed)
                .map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")));
        }
        parse_url(&format!("{}{trimmed}", self.base_url.trim_end_matches('/')))
    }

    fn link_for(&self, name: &str, target: &Path) -> Result<String> {
        match self.link_style {
            AttachmentLinkStyle::Relative => {
                let folder = self
                    .dir
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(format!("{folder}/{name}"))
            },
            AttachmentLinkStyle::Absolute => {
                Ok(std::path::absolute(target)?.to_string_lossy().into_owned())
            },
        }
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))
}

/// Local file name for an attachment: `<prefix>-<last path segment>`, with
/// whitespace replaced by underscores.
pub fn attachment_file_name(url: &Url, body: &[u8], naming: AttachmentNaming) -> String {
    let raw = url.path().rsplit('/').next().unwrap_or_default();
    let last = percent_decode_str(raw).decode_utf8_lossy();

    let prefix = match naming {
        AttachmentNaming::Random => fastrand::u64(..).to_string(),
        AttachmentNaming::ContentHash => content_hash_prefix(body),
    };

    format!("{prefix}-{last}")
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn content_hash_prefix(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(HASH_PREFIX_LEN);
    encoded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::transport::Credentials;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn relocator(base: &str, dir: &Path) -> AttachmentRelocator {
        let config = Config {
            base_url: Some(base.to_string()),
            ..Config::default()
        };
        let transport = Transport::new(&config, &Credentials::Bearer("t".into())).unwrap();
        AttachmentRelocator::new(
            transport,
            base,
            LinkPatterns::for_base_url(base).unwrap(),
            dir,
        )
    }

    fn page() -> Page {
        Page {
            id: "100".into(),
            title: "Home".into(),
            ..Page::default()
        }
    }

    #[test]
    fn test_file_name_decodes_and_replaces_spaces() {
        let url = Url::parse("https://w/download/attachments/1/My%20Diagram%20v2.png?api=v2")
            .unwrap();
        let name = attachment_file_name(&url, b"x", AttachmentNaming::Random);
        let (prefix, rest) = name.split_once('-').unwrap();
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest, "My_Diagram_v2.png");
    }

    #[test]
    fn test_content_hash_names_are_stable() {
        let url = Url::parse("https://w/download/attachments/1/a.png?api=v2").unwrap();
        let a = attachment_file_name(&url, b"same", AttachmentNaming::ContentHash);
        let b = attachment_file_name(&url, b"same", AttachmentNaming::ContentHash);
        let c = attachment_file_name(&url, b"different", AttachmentNaming::ContentHash);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.ends_with("-a.png"));
        assert_eq!(a.len(), HASH_PREFIX_LEN + "-a.png".len());
    }

    #[tokio::test]
    async fn test_relocate_writes_identical_bytes_and_rewrites_link() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        let body: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3, 255];
        Mock::given(method("GET"))
            .and(path("/download/attachments/100/diagram.png"))
            .and(query_param("api", "v2"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new()?;
        let dir = tmp.path().join("__attachments");
        std::fs::create_dir(&dir)?;
        let relocator = relocator(&server.uri(), &dir);

        let markdown = "intro\n\n![diagram](/download/attachments/100/diagram.png?version=1&api=v2)\n";
        let out = relocator.relocate(markdown, &page()).await?;

        assert_eq!(out.files.len(), 1);
        let file = &out.files[0];
        assert_eq!(std::fs::read(file)?, body);

        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("-diagram.png"));
        assert_eq!(out.markdown, format!("intro\n\n![diagram](__attachments/{name})\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_absolute_reference_and_absolute_link_style() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/attachments/7/report.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
            .mount(&server)
            .await;

        let tmp = TempDir::new()?;
        let dir = tmp.path().join("__attachments");
        std::fs::create_dir(&dir)?;
        let relocator = relocator(&server.uri(), &dir).with_link_style(AttachmentLinkStyle::Absolute);

        let markdown = format!(
            "[report]({}/download/attachments/7/report.pdf?api=v2)",
            server.uri()
        );
        let out = relocator.relocate(&markdown, &page()).await?;
        let file = std::path::absolute(&out.files[0])?;
        assert_eq!(out.markdown, format!("[report]({})", file.display()));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_references_are_downloaded_each_time() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/attachments/1/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a".to_vec()))
            .expect(2)
            .mount(&server)
            .await;

        let tmp = TempDir::new()?;
        let relocator = relocator(&server.uri(), tmp.path()).with_naming(AttachmentNaming::ContentHash);

        let markdown = "![x](/download/attachments/1/a.png?api=v2)\n![y](/download/attachments/1/a.png?api=v2)\n";
        let out = relocator.relocate(markdown, &page()).await?;
        assert_eq!(out.files.len(), 2);
        assert!(!out.markdown.contains("/download/attachments"));
        Ok(())
    }

    #[tokio::test]
    async fn test_two_attachments_on_one_line() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        for (name, bytes) in [("a.png", b"first".to_vec()), ("b.png", b"second".to_vec())] {
            Mock::given(method("GET"))
                .and(path(format!("/download/attachments/1/{name}")))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
                .expect(1)
                .mount(&server)
                .await;
        }

        let tmp = TempDir::new()?;
        let relocator = relocator(&server.uri(), tmp.path());
        let markdown =
            "![](/download/attachments/1/a.png?api=v2) and ![](/download/attachments/1/b.png?api=v2)";
        let out = relocator.relocate(markdown, &page()).await?;

        assert_eq!(out.files.len(), 2);
        assert_eq!(std::fs::read(&out.files[0])?, b"first");
        assert_eq!(std::fs::read(&out.files[1])?, b"second");
        let dir = tmp.path().file_name().unwrap().to_string_lossy().into_owned();
        let names: Vec<String> = out
            .files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            out.markdown,
            format!("![]({dir}/{}) and ![]({dir}/{})", names[0], names[1])
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_context_path_reference_is_not_doubled() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/confluence/download/attachments/5/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new()?;
        let dir = tmp.path().join("__attachments");
        std::fs::create_dir(&dir)?;
        let base = format!("{}/confluence", server.uri());
        let relocator = relocator(&base, &dir);

        let markdown = "![a](/confluence/download/attachments/5/a.png?api=v2)";
        let out = relocator.relocate(markdown, &page()).await?;

        let name = out.files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(out.markdown, format!("![a](__attachments/{name})"));
        assert!(!out.markdown.contains("/confluence"));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let tmp = TempDir::new()?;
        let relocator = relocator(&server.uri(), tmp.path());
        let err = relocator
            .relocate("![x](/download/attachments/1/a.png?api=v2)", &page())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 403, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_text_without_attachments_is_untouched() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let relocator = relocator("https://wiki.example.com", tmp.path());
        let out = relocator.relocate("# Title\n\nplain", &page()).await?;
        assert_eq!(out.markdown, "# Title\n\nplain");
        assert!(out.files.is_empty());
        Ok(())
    }
}
