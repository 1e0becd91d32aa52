//! Listing page link discovery
//!
//! This module extracts detail-page links and the "next page" link from one
//! page of a wiki category listing. Category markup is not stable, so both
//! searches walk ordered fallback chains:
//! - the listing container is the first of several layouts that matches
//! - links inside it are accepted by URL marker or by a five-digit anchor text
//! - if that finds nothing, the whole page is scanned with a looser text test

use crate::crawler::dom::{
    element_text, elements_named, first_match, selector_chain, SelectorChain,
};
use crate::crawler::fetcher::fetch_page;
use crate::{FetchError, FetchResult};
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

const LISTING_CONTAINER_SELECTORS: &[&str] = &[
    "div#mw-pages",
    "div.mw-category",
    "div.mw-category-group",
    "div#content",
    "div.mw-content-ltr",
];

const PAGINATION_SELECTORS: &[&str] = &[
    "div.mw-category-group a",
    "div#mw-pages a",
    r#"a[href*="pagefrom"]"#,
];

/// URL fragments that mark a fault-code detail page
const CODE_URL_MARKERS: &[&str] = &["fault_code", "fault-code", "faultcode"];

/// Query marker MediaWiki puts on category continuation links
const PAGE_CONTINUATION_MARKER: &str = "pagefrom=";

static FIVE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{5}").unwrap());
static LISTING_CONTAINER: LazyLock<SelectorChain> =
    LazyLock::new(|| selector_chain(LISTING_CONTAINER_SELECTORS));
static PAGINATION: LazyLock<SelectorChain> =
    LazyLock::new(|| selector_chain(PAGINATION_SELECTORS));

/// Links found on one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Candidate detail-page URLs, absolute, in discovery order, without repeats
    pub links: Vec<String>,

    /// Absolute URL of the next listing page, if any
    pub next_page: Option<String>,
}

/// Fetches a listing page and extracts its links
///
/// Fetch failures are returned to the caller unchanged; nothing is retried.
pub async fn discover(client: &Client, page_url: &str) -> FetchResult<ListingPage> {
    tracing::info!("Fetching fault code links from: {}", page_url);

    let base = Url::parse(page_url).map_err(|source| FetchError::InvalidUrl {
        url: page_url.to_string(),
        source,
    })?;
    let body = fetch_page(client, page_url).await?;
    let listing = parse_listing_page(&body, &base);

    tracing::info!("Found {} fault code links on this page", listing.links.len());
    Ok(listing)
}

/// Extracts candidate detail links and the next-page link from listing HTML
///
/// # Example
///
/// ```
/// use fault_harvest::crawler::parse_listing_page;
/// use url::Url;
///
/// let html = r#"<div id="mw-pages">
///     <a href="/wiki/00532">00532 - Supply Voltage</a>
///     <a href="/index.php?title=Category:Fault_Codes&pagefrom=00600">next page</a>
/// </div>"#;
/// let base = Url::parse("https://wiki.example.com/wiki/Category:Fault_Codes").unwrap();
/// let listing = parse_listing_page(html, &base);
/// assert_eq!(listing.links, vec!["https://wiki.example.com/wiki/00532"]);
/// assert!(listing.next_page.unwrap().ends_with("pagefrom=00600"));
/// ```
pub fn parse_listing_page(html: &str, base: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let mut links = match first_match(&document, &LISTING_CONTAINER) {
        Some((selector, container)) => {
            tracing::info!("Found category content using selector: {}", selector);
            collect_links(elements_named(container, &["a"]), base, is_code_link)
        }
        None => Vec::new(),
    };

    if links.is_empty() {
        tracing::info!("No links found with specific selectors, trying broader search...");
        links = collect_links(
            elements_named(document.root_element(), &["a"]),
            base,
            is_loose_code_link,
        );
    }

    ListingPage {
        links,
        next_page: find_next_page(&document, base),
    }
}

/// Container-scoped test: URL marker, or a five-digit run in the anchor text
fn is_code_link(href: &str, text: &str) -> bool {
    let href = href.to_lowercase();
    CODE_URL_MARKERS.iter().any(|marker| href.contains(marker)) || FIVE_DIGITS.is_match(text)
}

/// Whole-page test: five-digit anchor text that also says "fault" or "code"
fn is_loose_code_link(_href: &str, text: &str) -> bool {
    let lower = text.to_lowercase();
    FIVE_DIGITS.is_match(text) && (lower.contains("fault") || lower.contains("code"))
}

fn collect_links<'a>(
    anchors: impl Iterator<Item = ElementRef<'a>>,
    base: &Url,
    accept: fn(&str, &str) -> bool,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in anchors {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text = element_text(&anchor);
        if !accept(href, &text) {
            continue;
        }

        if let Some(url) = resolve_link(href, base) {
            tracing::debug!("Found fault code link: {} -> {}", text, url);
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
    }

    links
}

fn find_next_page(document: &Html, base: &Url) -> Option<String> {
    for (_, selector) in PAGINATION.iter() {
        for anchor in document.select(selector) {
            let href = anchor.value().attr("href").unwrap_or("");
            let text = element_text(&anchor);

            if href.contains(PAGE_CONTINUATION_MARKER) && text.to_lowercase().contains("next") {
                if let Some(url) = resolve_link(href, base) {
                    tracing::info!("Found next page link: {} -> {}", text, url);
                    return Some(url);
                }
            }
        }
    }

    None
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None for script, mail and telephone links, data URIs, same-page
/// fragments and anything that does not resolve.
fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url.to_string()),
        _ => None,
    }
}
