//! Crawler module: the pipeline around the admission filter
//!
//! This module contains:
//! - Page download from a pre-resolved address
//! - HTML parsing and link extraction
//! - The coordinator that feeds admitted URLs through both and reports back

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{Downloader, FetchError};
pub use parser::{extract_links, parse_html, ParsedPage};

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::ShoalError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Start the admission filter and apply the configured blacklist
/// 2. Submit the seed URLs
/// 3. Resolve, download and parse every admitted URL
/// 4. Feed outcomes and discovered links back into the filter
/// 5. Drain the filter and summarize
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(ShoalError)` - Crawl could not start
pub async fn crawl(config: &Config) -> Result<CrawlSummary, ShoalError> {
    run_crawl(config).await
}
