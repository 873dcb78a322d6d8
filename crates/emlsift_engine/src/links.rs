#![allow(clippy::expect_used)]

use std::collections::HashSet;
use std::sync::LazyLock;

use ego_tree::NodeRef;
use engine_logging::engine_debug;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use url::{Position, Url};

const DEFAULT_MAX_DOCUMENT_BYTES: usize = 32 * 1024 * 1024;
const LINK_PREFIX: &str = "http";

/// `http(s)://` followed by anything that is not whitespace or a quote.
static RAW_URL_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"https?://[^\s"']+"#).expect("RAW_URL_RE regex")
});

/// How the URL list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    /// Anchor `href`s from the parsed document, deduplicated.
    Document,
    /// Regex scan of the raw text. Duplicates are kept.
    RawScan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLinks {
    pub urls: Vec<String>,
    /// Host of each URL that parses; a URL that does not parse has no entry.
    pub domains: Vec<String>,
    pub source: LinkSource,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document of {size} bytes exceeds the {limit} byte limit for tree parsing")]
    TooLarge { size: usize, limit: usize },
}

/// Collects absolute hyperlinks and their hosts from an HTML body.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    max_document_bytes: usize,
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self::with_max_document_bytes(DEFAULT_MAX_DOCUMENT_BYTES)
    }

    /// Documents larger than `max_document_bytes` skip tree parsing and are scanned instead.
    pub fn with_max_document_bytes(max_document_bytes: usize) -> Self {
        Self { max_document_bytes }
    }

    pub fn extract(&self, html: &str) -> ExtractedLinks {
        if html.trim().is_empty() {
            return ExtractedLinks {
                urls: Vec::new(),
                domains: Vec::new(),
                source: LinkSource::Document,
            };
        }

        let (urls, source) = match self.parse_document(html) {
            Ok(document) => (dedupe(anchor_hrefs(&document)), LinkSource::Document),
            Err(err) => {
                engine_debug!("falling back to raw url scan: {}", err);
                (scan_raw_urls(html), LinkSource::RawScan)
            }
        };
        let domains = url_domains(&urls);

        ExtractedLinks {
            urls,
            domains,
            source,
        }
    }

    fn parse_document(&self, html: &str) -> Result<Html, DocumentError> {
        if html.len() > self.max_document_bytes {
            return Err(DocumentError::TooLarge {
                size: html.len(),
                limit: self.max_document_bytes,
            });
        }
        Ok(Html::parse_document(html))
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// `href` values starting with `http`, in document order.
fn anchor_hrefs(document: &Html) -> Vec<String> {
    let mut hrefs = Vec::new();
    for child in document.tree.root().children() {
        visit_node(child, &mut hrefs);
    }
    hrefs
}

fn visit_node(node: NodeRef<'_, Node>, hrefs: &mut Vec<String>) {
    if let Some(element) = ElementRef::wrap(node) {
        if element.value().name().eq_ignore_ascii_case("a") {
            if let Some(href) = element.value().attr("href") {
                if href.starts_with(LINK_PREFIX) {
                    hrefs.push(href.to_string());
                }
            }
        }
    }
    for child in node.children() {
        visit_node(child, hrefs);
    }
}

fn dedupe(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}

fn scan_raw_urls(text: &str) -> Vec<String> {
    RAW_URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Host (with any explicit port) of every URL that parses.
pub fn url_domains(urls: &[String]) -> Vec<String> {
    urls.iter()
        .filter_map(|raw| Url::parse(raw).ok())
        .map(|url| url[Position::BeforeHost..Position::AfterPort].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_anchors_are_visited_in_document_order() {
        let html = r#"<div><p><a href="http://b.com/">b</a></p><a href="https://a.com/">a</a></div>"#;
        assert_eq!(
            anchor_hrefs(&Html::parse_document(html)),
            vec!["http://b.com/", "https://a.com/"]
        );
    }

    #[test]
    fn raw_scan_stops_at_quotes_and_whitespace() {
        let text = r#"see http://a.com/x?y=1 and 'https://b.org/p' "http://a.com/x?y=1""#;
        assert_eq!(
            scan_raw_urls(text),
            vec!["http://a.com/x?y=1", "https://b.org/p", "http://a.com/x?y=1"]
        );
    }

    #[test]
    fn domains_keep_explicit_ports() {
        let urls = vec!["http://a.com:8080/x".to_string(), "https://b.org".to_string()];
        assert_eq!(url_domains(&urls), vec!["a.com:8080", "b.org"]);
    }
}
