//! Small helpers over the parsed document tree
//!
//! Markup on the source wiki varies between categories, so most lookups try
//! an ordered list of selectors and take the first one that matches.

use scraper::{ElementRef, Html, Selector};

/// Elements that start a new section
pub(crate) const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// An ordered list of selectors, each kept with its source text for logging
pub(crate) type SelectorChain = Vec<(&'static str, Selector)>;

/// Parses a fallback chain of selectors, dropping any that fail to parse
pub(crate) fn selector_chain(selectors: &[&'static str]) -> SelectorChain {
    selectors
        .iter()
        .filter_map(|raw| match Selector::parse(raw) {
            Ok(selector) => Some((*raw, selector)),
            Err(e) => {
                tracing::warn!("Skipping invalid selector {}: {:?}", raw, e);
                None
            }
        })
        .collect()
}

/// Returns the first element of the first selector in `chain` that matches anything
pub(crate) fn first_match<'a>(
    document: &'a Html,
    chain: &[(&'static str, Selector)],
) -> Option<(&'static str, ElementRef<'a>)> {
    chain
        .iter()
        .find_map(|(raw, selector)| document.select(selector).next().map(|el| (*raw, el)))
}

/// Elements below `scope` in document order, `scope` itself excluded
pub(crate) fn descendant_elements<'a>(
    scope: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    scope.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Descendants of `scope` whose tag name is one of `tags`
pub(crate) fn elements_named<'a>(
    scope: ElementRef<'a>,
    tags: &'static [&'static str],
) -> impl Iterator<Item = ElementRef<'a>> {
    descendant_elements(scope).filter(move |element| tags.contains(&element.value().name()))
}

/// All descendant text of an element, trimmed
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub(crate) fn is_heading(element: &ElementRef<'_>) -> bool {
    HEADING_TAGS.contains(&element.value().name())
}
