use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Shoal
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// URLs the crawl starts from
    pub seeds: Vec<String>,

    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,

    /// Hosts that are never admitted
    #[serde(default)]
    pub blacklist: Vec<HostEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of link hops from a seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages being resolved/fetched/parsed at once
    #[serde(rename = "max-concurrent-pages")]
    pub max_concurrent_pages: u32,

    /// Stop dispatching new pages once this many have been dispatched
    #[serde(rename = "max-pages")]
    pub max_pages: u64,

    /// Finish the crawl after this long with nothing in flight and nothing admitted (milliseconds)
    #[serde(rename = "idle-timeout-ms", default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Per-request fetch timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Accept invalid TLS certificates when fetching over https
    #[serde(rename = "accept-invalid-certs", default)]
    pub accept_invalid_certs: bool,
}

impl CrawlerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Admission filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Capacity of the filter's inbound command queue
    #[serde(rename = "request-buffer", default = "default_request_buffer")]
    pub request_buffer: usize,

    /// Capacity of the admitted-URL results queue
    #[serde(rename = "results-buffer", default = "default_results_buffer")]
    pub results_buffer: usize,

    /// Admission delay after the first consecutive server error (milliseconds);
    /// doubles with every further consecutive error
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Ceiling on the admission delay (milliseconds); 30s unless set
    #[serde(rename = "max-backoff-ms", default = "default_max_backoff_ms")]
    pub max_backoff_ms: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            request_buffer: default_request_buffer(),
            results_buffer: default_results_buffer(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
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

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// A blacklisted host
#[derive(Debug, Clone, Deserialize)]
pub struct HostEntry {
    /// Exact host name (e.g., "ads.example.com")
    pub host: String,
}

fn default_idle_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_request_buffer() -> usize {
    64
}

fn default_results_buffer() -> usize {
    64
}

fn default_backoff_base_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> Option<u64> {
    Some(30_000)
}
