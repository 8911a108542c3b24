//! Wikipedia link resolution
//!
//! Pages are identified by their decoded article path
//! (`/Rust_(programming_language)`, `/Schrödinger's_cat`).
//! The resolver fetches the rendered article, collects every `a[href]` outside
//! of navigation boxes and returns absolute URLs; the filter keeps plain
//! article links and maps them back to article paths.

use crate::error::{ConfigError, ResolveError};
use crate::web::node::Node;
use crate::web::resolver::{LinkFilter, NeighborResolver};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// Base of every English Wikipedia article URL, without the trailing slash.
pub const WIKIPEDIA_EN_BASE: &str = "https://en.wikipedia.org/wiki";

const LINKS_CSS_QUERY: &str = "a[href]";
const NAVBOX_CLASS_PARTS: [&str; 3] = ["nowraplinks", "mw-collapsible", "autocollapse"];
const USER_AGENT: &str = concat!("wikispider/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters escaped when an identity goes back into a URL path.
const ARTICLE_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Fetches article pages over HTTP.
pub struct WikiResolver {
    client: reqwest::blocking::Client,
    base: String,
}

impl WikiResolver {
    pub fn new() -> Result<Self, ResolveError> {
        Self::with_base(WIKIPEDIA_EN_BASE)
    }

    /// Use a different article base, e.g. another language edition.
    pub fn with_base(base: &str) -> Result<Self, ResolveError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ResolveError::Http {
                url: base.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn fetch(&self, url: &str) -> Result<String, ResolveError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| ResolveError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| ResolveError::Http {
            url: url.to_string(),
            source,
        })
    }
}

impl NeighborResolver for WikiResolver {
    fn resolve(&self, node: &Node) -> Result<Vec<String>, ResolveError> {
        let url = format!("{}{}", self.base, encode_identity(node.identity()));
        let page_url = Url::parse(&url).map_err(|_| ResolveError::InvalidUrl(url))?;
        let html = self.fetch(page_url.as_str())?;
        let links = extract_links(&html, &page_url);
        tracing::debug!(page = %node, links = links.len(), "fetched article");
        Ok(links)
    }
}

/// Collect absolute link targets from an HTML document.
///
/// Links inside navigation boxes are skipped; they point at loosely related
/// articles and blow up the branching factor.
pub fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse(LINKS_CSS_QUERY) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter(|link| !inside_navbox(link))
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| page_url.join(href).ok())
        .map(String::from)
        .collect()
}

fn inside_navbox(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|ancestor| ancestor.value().name() == "table")
        .any(|table| table.value().attr("class").is_some_and(is_navbox_class))
}

/// Class attribute starts with `nowraplinks` and later names
/// `mw-collapsible` and then `autocollapse`.
fn is_navbox_class(class: &str) -> bool {
    if !class.starts_with(NAVBOX_CLASS_PARTS[0]) {
        return false;
    }
    let mut rest = class;
    for part in NAVBOX_CLASS_PARTS {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}

/// Accepts links to plain articles and identifies them by article path.
#[derive(Debug, Clone)]
pub struct WikiFilter {
    prefix: String,
}

impl WikiFilter {
    pub fn new() -> Self {
        Self::with_base(WIKIPEDIA_EN_BASE)
    }

    pub fn with_base(base: &str) -> Self {
        Self {
            prefix: format!("{}/", base.trim_end_matches('/')),
        }
    }

    fn article<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.prefix)
    }
}

impl Default for WikiFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkFilter for WikiFilter {
    fn is_acceptable(&self, candidate: &str) -> bool {
        self.article(candidate)
            .is_some_and(is_article_name)
    }

    fn canonicalize(&self, candidate: &str) -> String {
        match self.article(candidate) {
            Some(article) => format!("/{}", decode_article(article)),
            None => candidate.to_string(),
        }
    }
}

// Namespaced pages (File:, Help:, ...), section anchors and queries are not
// articles. Slashes are part of titles such as `AC/DC`.
fn is_article_name(article: &str) -> bool {
    !article.is_empty() && !article.contains([':', '#', '?'])
}

fn decode_article(article: &str) -> String {
    percent_decode_str(article)
        .decode_utf8_lossy()
        .replace(' ', "_")
}

fn encode_identity(identity: &str) -> String {
    utf8_percent_encode(identity, ARTICLE_PATH).to_string()
}

/// Build a root node from a user-supplied article name, path or URL.
///
/// `Rust`, `/Rust` and `https://en.wikipedia.org/wiki/Rust` all give `/Rust`.
/// Spaces become underscores and escapes are decoded, matching the identities
/// [`WikiFilter`] gives discovered links.
pub fn node_from_path(path: &str) -> Result<Node, ConfigError> {
    let trimmed = path.trim();
    let article = trimmed
        .strip_prefix(WIKIPEDIA_EN_BASE)
        .unwrap_or(trimmed)
        .trim_start_matches('/');

    if !is_article_name(article) {
        return Err(ConfigError::InvalidIdentity {
            identity: path.to_string(),
            reason: "expected a plain article name".to_string(),
        });
    }
    Ok(Node::root(format!("/{}", decode_article(article))))
}

/// Article URL for a node identity.
pub fn url_for(node: &Node) -> String {
    format!("{}{}", WIKIPEDIA_EN_BASE, encode_identity(node.identity()))
}
