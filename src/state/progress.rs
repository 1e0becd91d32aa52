//! In-memory progress of one harvest run
//!
//! Tracks where pagination is and how detail pages have fared. Reset for
//! each run and never written to the store.

use std::fmt;
use std::time::{Duration, Instant};

/// Counters for a single run
#[derive(Debug, Clone)]
pub struct CrawlProgress {
    /// Listing page currently (or last) being discovered
    pub current_page_url: Option<String>,

    /// Listing pages visited so far
    pub pages_visited: u32,

    /// Detail links gathered across all listing pages
    pub links_found: usize,

    /// Detail pages attempted
    pub processed: usize,

    /// Records extracted and committed
    pub succeeded: usize,

    /// Detail pages that produced no record
    pub failed: usize,

    /// Records extracted but rejected by the store
    pub store_errors: usize,

    started_at: Instant,
}

impl CrawlProgress {
    /// Creates a fresh progress tracker starting now
    pub fn new() -> Self {
        Self {
            current_page_url: None,
            pages_visited: 0,
            links_found: 0,
            processed: 0,
            succeeded: 0,
            failed: 0,
            store_errors: 0,
            started_at: Instant::now(),
        }
    }

    /// Records that a listing page is about to be discovered
    pub fn begin_page(&mut self, url: &str) {
        self.current_page_url = Some(url.to_string());
        self.pages_visited += 1;
    }

    /// Adds links found on the current listing page
    pub fn add_links(&mut self, count: usize) {
        self.links_found += count;
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }

    /// The record was extracted but could not be stored
    pub fn record_store_error(&mut self) {
        self.processed += 1;
        self.failed += 1;
        self.store_errors += 1;
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for CrawlProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CrawlProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Success: {}, Errors: {}",
            self.succeeded, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_progress_is_zeroed() {
        let progress = CrawlProgress::new();
        assert_eq!(progress.pages_visited, 0);
        assert_eq!(progress.links_found, 0);
        assert_eq!(progress.processed, 0);
        assert!(progress.current_page_url.is_none());
    }

    #[test]
    fn test_page_and_link_tally() {
        let mut progress = CrawlProgress::new();
        progress.begin_page("https://wiki.example.com/a");
        progress.add_links(3);
        progress.begin_page("https://wiki.example.com/b");
        progress.add_links(2);

        assert_eq!(progress.pages_visited, 2);
        assert_eq!(progress.links_found, 5);
        assert_eq!(
            progress.current_page_url.as_deref(),
            Some("https://wiki.example.com/b")
        );
    }

    #[test]
    fn test_outcome_counters() {
        let mut progress = CrawlProgress::new();
        progress.record_success();
        progress.record_failure();
        progress.record_store_error();

        assert_eq!(progress.processed, 3);
        assert_eq!(progress.succeeded, 1);
        assert_eq!(progress.failed, 2);
        assert_eq!(progress.store_errors, 1);
        assert_eq!(progress.to_string(), "Success: 1, Errors: 2");
    }
}
