//! Crawler module for harvesting fault-code pages
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with a descriptive user agent
//! - Listing page link discovery and pagination
//! - Detail page parsing and section extraction
//! - Overall harvest coordination

mod coordinator;
mod discover;
mod dom;
mod fetcher;
mod page;
mod section;

pub use coordinator::{run_crawl, CollectedLinks, Coordinator, CrawlOptions, CrawlSummary};
pub use discover::{discover, parse_listing_page, ListingPage};
pub use fetcher::{build_http_client, fetch_page};
pub use page::{
    extract_code, extract_full_content, extract_record, extract_title, parse_detail_page,
    CAUSE_HEADINGS, SOLUTION_HEADINGS, SPECIAL_NOTE_HEADINGS, SYMPTOM_HEADINGS,
    TECHNICAL_INFO_HEADINGS,
};
pub use section::extract_section;
