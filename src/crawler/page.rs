//! Detail page parsing
//!
//! Turns one fetched fault-code page into a `FaultCodeRecord`:
//! - the code, from the URL or else the main heading
//! - the title, from the main heading with any leading code stripped
//! - the full text of the main content area
//! - one text block per known section, via `extract_section`

use crate::crawler::dom::{
    element_text, elements_named, first_match, is_heading, selector_chain, SelectorChain,
};
use crate::crawler::fetcher::fetch_page;
use crate::crawler::section::extract_section;
use crate::storage::FaultCodeRecord;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use std::sync::LazyLock;
use url::Url;

/// Heading synonyms for each section field, tried in order
pub const SYMPTOM_HEADINGS: &[&str] = &["Possible Symptoms", "Symptoms"];
pub const CAUSE_HEADINGS: &[&str] = &["Possible Causes", "Causes"];
pub const SOLUTION_HEADINGS: &[&str] = &["Possible Solutions", "Solutions"];
pub const SPECIAL_NOTE_HEADINGS: &[&str] = &[
    "Special Notes",
    "Notes",
    "Additional Information",
    "Additional Notes",
];
pub const TECHNICAL_INFO_HEADINGS: &[&str] = &[
    "Technical Information",
    "Technical Details",
    "Specifications",
    "Technical Data",
];

const MAIN_HEADING_SELECTORS: &[&str] = &["h1#firstHeading", "h1.firstHeading", "h1"];

const CONTENT_SELECTORS: &[&str] = &[
    "div#mw-content-text",
    "div.mw-content-ltr",
    "div#content",
    "div.mw-parser-output",
];

/// Fragments of full content this short are dropped
const MAX_NOISE_CHARS: usize = 3;

/// Elements inside the content area that contribute text
const CONTENT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "div", "span",
];

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{5}").unwrap());
static HEADING_CODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[-:]\s*").unwrap());

static MAIN_HEADING: LazyLock<SelectorChain> =
    LazyLock::new(|| selector_chain(MAIN_HEADING_SELECTORS));
static CONTENT_AREA: LazyLock<SelectorChain> = LazyLock::new(|| selector_chain(CONTENT_SELECTORS));

/// Fetches and parses one detail page
///
/// Returns `None` when the fetch fails or the page yields no storable record;
/// both are logged and counted by the caller as a per-item error.
pub async fn extract_record(client: &Client, url: &str) -> Option<FaultCodeRecord> {
    match fetch_page(client, url).await {
        Ok(body) => parse_detail_page(url, &body),
        Err(e) => {
            tracing::error!("Error fetching page {}: {}", e.url(), e);
            None
        }
    }
}

/// Parses a detail page body into a record
///
/// Returns `None` when no five-digit code can be found in the URL or the main
/// heading, or when the page has no non-empty main content area.
///
/// # Example
///
/// ```
/// use fault_harvest::crawler::parse_detail_page;
///
/// let html = r#"<h1 id="firstHeading">00532 - Supply Voltage B+</h1>
///     <div id="mw-content-text"><h2>Possible Symptoms</h2><p>Rough idle</p></div>"#;
/// let record = parse_detail_page("https://wiki.example.com/wiki/00532", html).unwrap();
/// assert_eq!(record.code, "00532");
/// assert_eq!(record.title.as_deref(), Some("Supply Voltage B+"));
/// assert_eq!(record.symptoms.as_deref(), Some("Rough idle"));
/// ```
pub fn parse_detail_page(url: &str, html: &str) -> Option<FaultCodeRecord> {
    let document = Html::parse_document(html);

    let Some(code) = extract_code(url, &document) else {
        tracing::warn!("Could not extract fault code from: {}", url);
        return None;
    };

    let full_content = extract_full_content(&document);
    if full_content.is_empty() {
        tracing::warn!("No main content found for {} at {}", code, url);
        return None;
    }

    Some(FaultCodeRecord {
        code,
        title: non_empty(extract_title(&document)),
        full_content: Some(full_content),
        symptoms: non_empty(extract_section(&document, SYMPTOM_HEADINGS)),
        causes: non_empty(extract_section(&document, CAUSE_HEADINGS)),
        solutions: non_empty(extract_section(&document, SOLUTION_HEADINGS)),
        special_notes: non_empty(extract_section(&document, SPECIAL_NOTE_HEADINGS)),
        technical_info: non_empty(extract_section(&document, TECHNICAL_INFO_HEADINGS)),
    })
}

/// Derives the fault code from the URL, falling back to the main heading
///
/// Only the path, query and fragment of the URL are searched, so a numeric
/// port is never mistaken for a code.
pub fn extract_code(url: &str, document: &Html) -> Option<String> {
    find_code(&url_searchable_part(url)).or_else(|| {
        main_heading_text(document)
            .as_deref()
            .and_then(find_code)
    })
}

/// Main heading text with a leading `<code> - ` or `<code>: ` removed
pub fn extract_title(document: &Html) -> String {
    main_heading_text(document)
        .map(|text| HEADING_CODE_PREFIX.replace(&text, "").trim().to_string())
        .unwrap_or_default()
}

/// Concatenated text of the main content area
///
/// Every paragraph, heading, list, list item, div and span inside the content
/// area contributes its trimmed text, in document order. Headings and lists
/// are padded with blank lines. Nested elements contribute again, matching
/// how the stored text has always been built.
pub fn extract_full_content(document: &Html) -> String {
    let Some((selector, area)) = first_match(document, &CONTENT_AREA) else {
        return String::new();
    };
    tracing::debug!("Found main content using selector: {}", selector);

    let mut parts = Vec::new();
    for element in elements_named(area, CONTENT_TAGS) {
        let text = element_text(&element);
        if text.chars().count() <= MAX_NOISE_CHARS {
            continue;
        }

        let tag = element.value().name();
        if is_heading(&element) || tag == "ul" || tag == "ol" {
            parts.push(format!("\n{}\n", text));
        } else {
            parts.push(text);
        }
    }

    parts.join("\n")
}

fn main_heading_text(document: &Html) -> Option<String> {
    first_match(document, &MAIN_HEADING).map(|(_, heading)| element_text(&heading))
}

fn find_code(text: &str) -> Option<String> {
    CODE_PATTERN.find(text).map(|m| m.as_str().to_string())
}

fn url_searchable_part(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let mut part = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                part.push('?');
                part.push_str(query);
            }
            if let Some(fragment) = parsed.fragment() {
                part.push('#');
                part.push_str(fragment);
            }
            part
        }
        Err(_) => url.to_string(),
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_URL: &str = "https://wiki.example.com/wiki/index.php/00532";

    fn page(heading: &str, content: &str) -> String {
        format!(
            r#"<html><body>
            <h1 id="firstHeading" class="firstHeading">{}</h1>
            <div id="content"><div id="mw-content-text"><div class="mw-parser-output">{}</div></div></div>
            </body></html>"#,
            heading, content
        )
    }

    #[test]
    fn test_end_to_end_single_section() {
        let html = page(
            "00532 - Throttle Position Sensor",
            "<h2>Possible Symptoms</h2><p>Rough idle</p>",
        );

        let record = parse_detail_page(DETAIL_URL, &html).unwrap();

        assert_eq!(record.code, "00532");
        assert_eq!(record.title.as_deref(), Some("Throttle Position Sensor"));
        assert_eq!(record.symptoms.as_deref(), Some("Rough idle"));
        assert_eq!(record.causes, None);
        assert_eq!(record.solutions, None);
        assert_eq!(record.special_notes, None);
        assert_eq!(record.technical_info, None);
    }

    #[test]
    fn test_code_from_heading_when_url_has_none() {
        let html = page("01314: Engine Control Module", "<p>No communication</p>");
        let record = parse_detail_page("https://wiki.example.com/wiki/ECM_fault", &html).unwrap();
        assert_eq!(record.code, "01314");
        assert_eq!(record.title.as_deref(), Some("Engine Control Module"));
    }

    #[test]
    fn test_url_code_preferred_over_heading() {
        let html = page("01314 - Engine Control Module", "<p>No communication</p>");
        let record = parse_detail_page(DETAIL_URL, &html).unwrap();
        assert_eq!(record.code, "00532");
    }

    #[test]
    fn test_port_is_not_a_code() {
        let document = Html::parse_document(&page("Throttle Body", "<p>text</p>"));
        assert_eq!(
            extract_code("http://127.0.0.1:54321/wiki/Throttle_Body", &document),
            None
        );
    }

    #[test]
    fn test_no_code_yields_none() {
        let html = page("Throttle Body", "<p>Some description</p>");
        assert!(parse_detail_page("https://wiki.example.com/wiki/Throttle_Body", &html).is_none());
    }

    #[test]
    fn test_missing_content_area_yields_none() {
        let html = r#"<html><body><h1 class="firstHeading">00532 - X</h1><p>loose text</p></body></html>"#;
        assert!(parse_detail_page(DETAIL_URL, html).is_none());
    }

    #[test]
    fn test_title_without_code_prefix_kept() {
        let document = Html::parse_document(&page("  Supply Voltage  ", ""));
        assert_eq!(extract_title(&document), "Supply Voltage");
    }

    #[test]
    fn test_title_missing_heading_is_empty() {
        let document = Html::parse_document("<html><body><p>x</p></body></html>");
        assert_eq!(extract_title(&document), "");
    }

    #[test]
    fn test_full_content_structure() {
        let document = Html::parse_document(&page(
            "00532 - X",
            "<h2>Possible Causes</h2><p>Open circuit</p><p>ok</p>",
        ));

        let content = extract_full_content(&document);

        // The wrapping parser-output div contributes its whole text first
        assert!(content.contains("\nPossible Causes\n"));
        assert!(content.contains("Open circuit"));
        assert!(!content.lines().any(|line| line == "ok"));
    }

    #[test]
    fn test_all_sections_extracted() {
        let html = page(
            "00532 - Supply Voltage B+",
            "<h2>Possible Symptoms</h2><ul><li>Hard start</li></ul>\
             <h2>Possible Causes</h2><p>Weak battery</p>\
             <h2>Possible Solutions</h2><p>Charge battery</p>\
             <h2>Special Notes</h2><p>Check ground straps</p>\
             <h2>Technical Data</h2><p>12.6V at rest</p>",
        );

        let record = parse_detail_page(DETAIL_URL, &html).unwrap();

        assert_eq!(record.symptoms.as_deref(), Some("Hard start"));
        assert_eq!(record.causes.as_deref(), Some("Weak battery"));
        assert_eq!(record.solutions.as_deref(), Some("Charge battery"));
        assert_eq!(record.special_notes.as_deref(), Some("Check ground straps"));
        assert_eq!(record.technical_info.as_deref(), Some("12.6V at rest"));
    }
}
