//! State module for tracking crawl progress
//!
//! This module provides the in-memory state of one harvest run.
//!
//! # Components
//!
//! - `CrawlProgress`: pagination position, link tally and per-record outcome counters
//!
//! Nothing here is persisted; every run starts from `CrawlProgress::new`.

mod progress;

pub use progress::CrawlProgress;
