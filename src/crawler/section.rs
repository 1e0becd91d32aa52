//! Named section extraction
//!
//! A detail page is a flat run of headings and content blocks. A section is
//! the content that follows a heading whose text names it, up to the next
//! heading of any level.

use crate::crawler::dom::{element_text, elements_named, is_heading, HEADING_TAGS};
use scraper::{ElementRef, Html};

/// Elements whose text belongs to a section
const SECTION_BODY_TAGS: &[&str] = &["p", "ul", "ol", "li", "div", "span"];

/// Section bodies shorter than this are treated as noise
const MIN_SECTION_TEXT_CHARS: usize = 3;

/// Extracts the text of the first section whose heading names a candidate
///
/// Candidates are tried in order. For each, headings are scanned in document
/// order; a heading matches when its trimmed text contains the candidate,
/// case-insensitively. The first matching heading with non-empty content
/// wins and no further candidates are tried.
///
/// Returns an empty string when no candidate yields content.
///
/// # Example
///
/// ```
/// use fault_harvest::crawler::extract_section;
/// use scraper::Html;
///
/// let doc = Html::parse_document(
///     "<h2>Symptoms</h2><p>Rough idle</p><h2>Causes</h2><p>Vacuum leak</p>",
/// );
/// assert_eq!(extract_section(&doc, &["Symptoms"]), "Rough idle");
/// ```
pub fn extract_section(document: &Html, candidates: &[&str]) -> String {
    for candidate in candidates {
        let needle = candidate.to_lowercase();

        for heading in elements_named(document.root_element(), HEADING_TAGS) {
            if !element_text(&heading).to_lowercase().contains(&needle) {
                continue;
            }

            let content = section_body(heading);
            if !content.is_empty() {
                return content.join("\n");
            }
        }
    }

    String::new()
}

/// Collects the texts of the siblings following `heading` up to the next heading
fn section_body(heading: ElementRef<'_>) -> Vec<String> {
    let mut content = Vec::new();

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        if is_heading(&sibling) {
            break;
        }
        if !SECTION_BODY_TAGS.contains(&sibling.value().name()) {
            continue;
        }

        let text = element_text(&sibling);
        if text.chars().count() >= MIN_SECTION_TEXT_CHARS {
            content.push(text);
        }
    }

    content
}
