//! Crawl statistics
//!
//! Counters the pipeline bumps while it runs, and the summary printed once
//! the crawl has finished.

use crate::filter::FilterSummary;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every page task
#[derive(Debug, Default)]
pub struct CrawlCounters {
    dispatched: AtomicU64,
    fetched: AtomicU64,
    fetch_failures: AtomicU64,
    resolution_failures: AtomicU64,
    server_errors: AtomicU64,
    links_discovered: AtomicU64,
    links_submitted: AtomicU64,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resolution_failure(&self) {
        self.resolution_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A page came back with 429 or 5xx
    pub fn record_server_error(&self) {
        self.server_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// `found` links on a page, of which `submitted` were handed to the filter
    pub fn record_links(&self, found: u64, submitted: u64) {
        self.links_discovered.fetch_add(found, Ordering::Relaxed);
        self.links_submitted.fetch_add(submitted, Ordering::Relaxed);
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn fetched(&self) -> u64 {
        self.fetched.load(Ordering::Relaxed)
    }
}

/// Everything known about a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the config file, when the crawl was started from one
    pub config_hash: Option<String>,

    /// URLs taken from the filter's results and handed to a page task
    pub pages_dispatched: u64,

    /// Pages downloaded, whatever their status
    pub pages_fetched: u64,

    /// Pages that came back with 429 or 5xx
    pub server_errors: u64,

    /// Downloads that failed below HTTP
    pub fetch_failures: u64,

    pub resolution_failures: u64,

    /// Links found on fetched pages
    pub links_discovered: u64,

    /// Links handed to the filter (within the depth limit)
    pub links_submitted: u64,

    /// Hosts with a cached address at the end of the crawl
    pub hosts_resolved: usize,

    /// Admitted URLs still waiting when the crawl stopped
    pub left_in_frontier: u64,

    pub filter: FilterSummary,
}

impl CrawlSummary {
    /// Snapshots the counters into a summary
    pub fn from_counters(
        counters: &CrawlCounters,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            config_hash: None,
            pages_dispatched: counters.dispatched.load(Ordering::Relaxed),
            pages_fetched: counters.fetched.load(Ordering::Relaxed),
            server_errors: counters.server_errors.load(Ordering::Relaxed),
            fetch_failures: counters.fetch_failures.load(Ordering::Relaxed),
            resolution_failures: counters.resolution_failures.load(Ordering::Relaxed),
            links_discovered: counters.links_discovered.load(Ordering::Relaxed),
            links_submitted: counters.links_submitted.load(Ordering::Relaxed),
            hosts_resolved: 0,
            left_in_frontier: 0,
            filter: FilterSummary::default(),
        }
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }

    /// Share of dispatched pages that downloaded, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_dispatched == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / self.pages_dispatched as f64) * 100.0
        }
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Started:  {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {}s", summary.duration_seconds());
    if let Some(hash) = &summary.config_hash {
        println!("  Config hash: {}", hash);
    }
    println!();

    println!("Pages:");
    println!("  Dispatched: {}", summary.pages_dispatched);
    println!("  Fetched: {}", summary.pages_fetched);
    println!("  Server errors (429/5xx): {}", summary.server_errors);
    println!("  Fetch failures: {}", summary.fetch_failures);
    println!("  Resolution failures: {}", summary.resolution_failures);
    println!("  Left in frontier: {}", summary.left_in_frontier);
    println!();

    println!("Links:");
    println!("  Discovered: {}", summary.links_discovered);
    println!("  Submitted: {}", summary.links_submitted);
    println!();

    let filter = &summary.filter;
    println!("Filter:");
    println!("  Hosts: {} ({} resolved)", filter.hosts, summary.hosts_resolved);
    println!("  Admitted: {}", filter.admitted);
    println!("  Duplicates dropped: {}", filter.duplicates);
    println!("  Blacklisted dropped: {}", filter.blacklisted);
    println!("  Unroutable dropped: {}", filter.unroutable);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        summary.success_rate(),
        summary.pages_fetched,
        summary.pages_dispatched
    );
}
