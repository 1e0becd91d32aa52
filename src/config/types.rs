use serde::Deserialize;

/// Category listing the original harvest was seeded from
pub const DEFAULT_START_URL: &str =
    "https://wiki.ross-tech.com/wiki/index.php?title=Category:Fault_Codes&pageuntil=01262#mw-pages";

/// Main configuration structure for Fault-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// First listing page of the fault-code category
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Fixed delay between consecutive fetches (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Hard cap on listing pages followed through pagination
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Number of detail links processed in test mode
    #[serde(rename = "test-mode-limit")]
    pub test_mode_limit: usize,

    /// Emit a progress line every N detail pages
    #[serde(rename = "progress-interval")]
    pub progress_interval: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            request_delay_ms: 1000,
            max_pages: 50,
            test_mode_limit: 5,
            progress_interval: 10,
            request_timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "fault-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/fault-harvest/fault-harvest".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path of the gzip snapshot written by `--export-snapshot`
    #[serde(rename = "snapshot-path")]
    pub snapshot_path: String,

    /// Path of the JSON metadata descriptor written next to the snapshot
    #[serde(rename = "metadata-path")]
    pub metadata_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "fault_codes.db".to_string(),
            snapshot_path: "fault_codes.db.gz".to_string(),
            metadata_path: "database_info.json".to_string(),
        }
    }
}
