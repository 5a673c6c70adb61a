//! Output module for crawl statistics and the end-of-run summary

pub mod stats;

pub use stats::{print_summary, CrawlCounters, CrawlSummary};
