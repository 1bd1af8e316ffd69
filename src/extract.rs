//! Headline extraction from an agency listing page.
//!
//! The agencies run Liferay portals, whose news listings render headline
//! anchors inside `asset-full-content` or `asset-list` containers. A single
//! selector covers the three layouts and is shared by every source.
//!
//! # Link normalization
//!
//! Hrefs that do not start with `http` are treated as site-relative and
//! prefixed with the source's `scheme://host[:port]` by plain string
//! concatenation ([`LinkResolution::Concat`]). [`LinkResolution::Join`]
//! instead resolves them against the full source URL, which differs for
//! hrefs without a leading slash (`detalhe/1`) or with `../` segments.

use crate::decode::decode_html;
use crate::models::{NewsItem, Source};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Structural selector for headline anchors.
pub const HEADLINE_SELECTOR: &str =
    "div.asset-full-content a, ul.asset-full-content a, .asset-list a";

/// Only the first matches of each page are considered.
pub const MAX_ITEMS_PER_SOURCE: usize = 5;

static HEADLINES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(HEADLINE_SELECTOR).expect("HEADLINE_SELECTOR is a valid CSS selector")
});

/// How relative hrefs are turned into absolute links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkResolution {
    /// `scheme://host` of the source URL followed by the href verbatim.
    #[default]
    Concat,
    /// RFC 3986 resolution of the href against the full source URL.
    Join,
}

/// Extract up to [`MAX_ITEMS_PER_SOURCE`] headlines from `body`.
///
/// `charset` is the label the server declared, if any; see
/// [`crate::decode`] for how the body is turned into text.
///
/// Malformed markup never fails; it only yields fewer items. Candidates with
/// an empty title or a missing/empty href are skipped, and they still count
/// against the cap.
#[instrument(level = "debug", skip_all, fields(source = %source.name, bytes = body.len()))]
pub fn extract(
    source: &Source,
    body: &[u8],
    charset: Option<&str>,
    links: LinkResolution,
) -> Vec<NewsItem> {
    let html = decode_html(body, charset);
    let document = Html::parse_document(&html);
    let base = Url::parse(&source.url).ok();

    let items: Vec<NewsItem> = document
        .select(&HEADLINES)
        .take(MAX_ITEMS_PER_SOURCE)
        .filter_map(headline)
        .map(|(title, href)| {
            let link = resolve_link(base.as_ref(), &href, links);
            NewsItem::new(source.name.as_str(), title, link)
        })
        .collect();

    debug!(count = items.len(), "Extracted headlines");
    items
}

/// Title and raw href of a candidate anchor, if both are present.
fn headline(element: ElementRef<'_>) -> Option<(String, String)> {
    let title = element.text().collect::<String>().trim().to_string();
    let href = element.value().attr("href")?;
    if title.is_empty() || href.is_empty() {
        return None;
    }
    Some((title, href.to_string()))
}

/// Turn `href` into an absolute link relative to the source URL.
///
/// Hrefs starting with `http` pass through untouched. Without a parseable
/// base the href is returned as-is.
pub fn resolve_link(base: Option<&Url>, href: &str, mode: LinkResolution) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    let Some(base) = base else {
        return href.to_string();
    };

    match mode {
        LinkResolution::Concat => match origin(base) {
            Some(origin) => format!("{origin}{href}"),
            None => href.to_string(),
        },
        LinkResolution::Join => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
    }
}

/// `scheme://host[:port]` of `url`.
fn origin(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
