//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the harvest loop, which runs in two phases:
//! - follow listing pages through pagination, gathering detail links
//! - fetch and parse every detail link, upserting each record
//!
//! Everything is sequential: one request in flight, with a fixed pause
//! between consecutive requests. A cancellation token is checked before
//! every fetch and also cuts the pause short.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::discover::discover;
use crate::crawler::page::extract_record;
use crate::crawler::build_http_client;
use crate::state::CrawlProgress;
use crate::storage::{FaultCodeStore, SqliteStore};
use crate::HarvestError;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Knobs for one harvest run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Pause between consecutive requests
    pub request_delay: Duration,

    /// Hard cap on listing pages followed
    pub max_pages: u32,

    /// Process only the first `test_mode_limit` links, reporting every item
    pub test_mode: bool,

    pub test_mode_limit: usize,

    /// Report progress every N detail pages
    pub progress_interval: usize,
}

impl CrawlOptions {
    pub fn from_config(config: &CrawlerConfig, test_mode: bool) -> Self {
        Self {
            request_delay: Duration::from_millis(config.request_delay_ms),
            max_pages: config.max_pages,
            test_mode,
            test_mode_limit: config.test_mode_limit,
            progress_interval: config.progress_interval.max(1),
        }
    }

    /// Whether a progress line is due after the item at 1-based `position`
    ///
    /// Test mode reports every item; otherwise every `progress_interval`th.
    pub fn should_report(&self, position: usize) -> bool {
        self.test_mode || position % self.progress_interval.max(1) == 0
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default(), false)
    }
}

/// Outcome of a harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_visited: u32,
    pub links_found: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub store_errors: usize,

    /// Pagination stopped at the page cap with a next page still pending
    pub page_cap_reached: bool,

    /// The run was interrupted before finishing
    pub cancelled: bool,

    pub elapsed: Duration,
}

impl CrawlSummary {
    fn from_progress(progress: &CrawlProgress, page_cap_reached: bool, cancelled: bool) -> Self {
        Self {
            pages_visited: progress.pages_visited,
            links_found: progress.links_found,
            processed: progress.processed,
            succeeded: progress.succeeded,
            failed: progress.failed,
            store_errors: progress.store_errors,
            page_cap_reached,
            cancelled,
            elapsed: progress.elapsed(),
        }
    }
}

/// Links gathered by the pagination phase
#[derive(Debug, Clone, Default)]
pub struct CollectedLinks {
    /// Detail links across all pages, in discovery order, repeats included
    pub links: Vec<String>,

    pub page_cap_reached: bool,

    pub cancelled: bool,
}

/// Main harvest coordinator
pub struct Coordinator<S: FaultCodeStore> {
    client: Client,
    store: S,
    options: CrawlOptions,
    cancel: CancellationToken,
}

impl<S: FaultCodeStore> Coordinator<S> {
    /// Creates a coordinator writing into `store`
    pub fn new(client: Client, store: S, options: CrawlOptions) -> Self {
        Self {
            client,
            store,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop the run early
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Follows pagination from `start_url`, gathering detail links
    ///
    /// Stops when a page has no next link, when a listing fetch fails, or
    /// when `max_pages` pages have been visited. A failed listing fetch is
    /// treated as the last page.
    pub async fn collect_links(
        &self,
        start_url: &str,
        progress: &mut CrawlProgress,
    ) -> CollectedLinks {
        tracing::info!("Starting to crawl all pages for fault code links...");

        let mut collected = CollectedLinks::default();
        let mut next_url = Some(start_url.to_string());

        while let Some(url) = next_url.take() {
            if progress.pages_visited >= self.options.max_pages {
                tracing::warn!(
                    "Reached maximum page limit ({}). There might be more pages.",
                    self.options.max_pages
                );
                collected.page_cap_reached = true;
                break;
            }

            if progress.pages_visited > 0 && !self.pause().await {
                collected.cancelled = true;
                break;
            }
            if self.cancel.is_cancelled() {
                collected.cancelled = true;
                break;
            }

            progress.begin_page(&url);
            tracing::info!("Processing page {}...", progress.pages_visited);

            match discover(&self.client, &url).await {
                Ok(listing) => {
                    progress.add_links(listing.links.len());
                    tracing::info!(
                        "Page {}: Found {} links (Total so far: {})",
                        progress.pages_visited,
                        listing.links.len(),
                        progress.links_found
                    );
                    collected.links.extend(listing.links);
                    next_url = listing.next_page;
                }
                Err(e) => {
                    tracing::error!("Error fetching listing page {}: {}", e.url(), e);
                }
            }

            if next_url.is_none() {
                tracing::info!("No more pages found. Crawling complete.");
            }
        }

        tracing::info!(
            "Total fault code links found across {} pages: {}",
            progress.pages_visited,
            collected.links.len()
        );
        collected
    }

    /// Runs a complete harvest starting at `start_url`
    ///
    /// Per-page failures never abort the run: a page that yields no record is
    /// counted as an error, and a record the store rejects is logged and
    /// counted. Records committed before a cancellation stay committed.
    pub async fn crawl_all(&mut self, start_url: &str) -> CrawlSummary {
        tracing::info!("Starting fault code crawling...");
        let mut progress = CrawlProgress::new();

        let collected = self.collect_links(start_url, &mut progress).await;
        if collected.cancelled {
            tracing::warn!("Crawl cancelled during link discovery");
            return CrawlSummary::from_progress(&progress, collected.page_cap_reached, true);
        }

        let mut links = collected.links;
        if links.is_empty() {
            tracing::error!("No fault code links found!");
            return CrawlSummary::from_progress(&progress, collected.page_cap_reached, false);
        }

        if self.options.test_mode {
            links.truncate(self.options.test_mode_limit);
            tracing::info!(
                "Test mode: Processing only first {} fault code pages...",
                links.len()
            );
        } else {
            tracing::info!("Processing {} fault code pages...", links.len());
        }

        let cancelled = self.process_links(&links, &mut progress).await;

        if cancelled {
            tracing::warn!(
                "Crawl cancelled after {}/{} pages. {}",
                progress.processed,
                links.len(),
                progress
            );
        } else {
            tracing::info!("Crawling completed! {}", progress);
        }

        CrawlSummary::from_progress(&progress, collected.page_cap_reached, cancelled)
    }

    /// Extracts and stores each link in turn; returns true if cancelled
    async fn process_links(&mut self, links: &[String], progress: &mut CrawlProgress) -> bool {
        let total = links.len();

        for (index, link) in links.iter().enumerate() {
            // The listing fetch that preceded this one also earns a pause
            if !self.pause().await {
                return true;
            }

            let position = index + 1;
            tracing::info!("Processing {}/{}: {}", position, total, link);

            match extract_record(&self.client, link).await {
                Some(record) => match self.store.upsert(&record) {
                    Ok(()) => {
                        tracing::info!(
                            "Saved fault code: {} - {}",
                            record.code,
                            record.title.as_deref().unwrap_or("")
                        );
                        progress.record_success();
                    }
                    Err(e) => {
                        tracing::error!("Database error saving {}: {}", record.code, e);
                        progress.record_store_error();
                    }
                },
                None => progress.record_failure(),
            }

            if self.options.should_report(position) {
                tracing::info!("Progress: {}/{} completed. {}", position, total, progress);
            }
        }

        false
    }

    /// Waits out the request delay; returns false if cancelled first
    async fn pause(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        if self.options.request_delay.is_zero() {
            return true;
        }

        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.options.request_delay) => true,
        }
    }
}

/// Runs a harvest with the store and client described by `config`
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `test_mode` - Process only the first few discovered links
/// * `cancel` - Token that stops the run before its next fetch
///
/// # Example
///
/// ```no_run
/// use fault_harvest::config::Config;
/// use fault_harvest::crawler::run_crawl;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_crawl(&Config::default(), true, CancellationToken::new()).await?;
/// println!("{} records saved", summary.succeeded);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    test_mode: bool,
    cancel: CancellationToken,
) -> Result<CrawlSummary, HarvestError> {
    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let client = build_http_client(&config.user_agent, &config.crawler)?;
    let options = CrawlOptions::from_config(&config.crawler, test_mode);

    let mut coordinator = Coordinator::new(client, store, options).with_cancellation(cancel);
    Ok(coordinator.crawl_all(&config.crawler.start_url).await)
}
