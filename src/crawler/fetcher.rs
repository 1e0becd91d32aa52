//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with a descriptive user agent string
//! - GET requests for listing and detail pages
//! - Error classification into `FetchError`
//!
//! Fetches are never retried here; the coordinator decides what a failure means.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::{FetchError, FetchResult};
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Crawler settings (request timeout)
///
/// # Example
///
/// ```no_run
/// use fault_harvest::config::Config;
/// use fault_harvest::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body with a single GET request
///
/// # Errors
///
/// | Condition | Result |
/// |-----------|--------|
/// | Non-2xx status | `FetchError::Status` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection or body failure | `FetchError::Network` |
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}
