//! Crawl coordinator
//!
//! Drives the pipeline around the admission filter:
//! - seeds and configured blacklist entries go into the filter
//! - every admitted URL becomes one page task (resolve, download, report, parse)
//! - links found on a page go back into the filter one level deeper
//!
//! The crawl stops when the page budget is spent or nothing has been in
//! flight or admitted for the idle timeout. Whatever the filter still holds
//! at that point is drained and counted, not fetched.

use crate::config::Config;
use crate::crawler::fetcher::Downloader;
use crate::crawler::parser::extract_links;
use crate::filter::{Filter, Outcome, OutcomeReport};
use crate::output::{CrawlCounters, CrawlSummary};
use crate::record::CrawlRecord;
use crate::resolver::{resolve_record, Lookup, ResolutionCache, SystemLookup};
use crate::url::parse_seed;
use crate::ShoalError;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use url::Url;

/// State shared by the dispatcher and every page task
struct Shared<L> {
    filter: Filter,
    resolver: ResolutionCache<L>,
    downloader: Downloader,
    counters: CrawlCounters,
    /// Shallowest depth each submitted URL was found at
    depths: Mutex<HashMap<String, u32>>,
    max_depth: u32,
}

impl<L> Shared<L> {
    /// Remembers the depth a URL is about to be submitted at
    ///
    /// Returns false if it was already submitted at this depth or shallower.
    fn note_depth(&self, url: &Url, depth: u32) -> bool {
        let mut depths = self.depths.lock().unwrap_or_else(|e| e.into_inner());
        match depths.get_mut(url.as_str()) {
            Some(known) if *known <= depth => false,
            Some(known) => {
                *known = depth;
                true
            }
            None => {
                depths.insert(url.as_str().to_string(), depth);
                true
            }
        }
    }

    fn depth_of(&self, url: &Url) -> u32 {
        self.depths
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<L = SystemLookup> {
    shared: Arc<Shared<L>>,
    seeds: Vec<Url>,
    blacklist: Vec<String>,
    max_pages: u64,
    max_concurrent_pages: usize,
    idle_timeout: Duration,
}

impl Coordinator<SystemLookup> {
    /// Creates a coordinator that resolves through the operating system
    ///
    /// Must be called inside a Tokio runtime; the filter starts immediately.
    pub fn new(config: &Config) -> Result<Self, ShoalError> {
        Self::with_resolver(config, ResolutionCache::new())
    }
}

impl<L: Lookup + 'static> Coordinator<L> {
    /// Creates a coordinator around an existing resolution cache
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ShoalError)` - A seed URL is invalid
    pub fn with_resolver(
        config: &Config,
        resolver: ResolutionCache<L>,
    ) -> Result<Self, ShoalError> {
        let seeds = config
            .seeds
            .iter()
            .map(|seed| parse_seed(seed))
            .collect::<Result<Vec<_>, _>>()?;

        let shared = Shared {
            filter: Filter::new(&config.filter),
            resolver,
            downloader: Downloader::new(&config.crawler, &config.user_agent),
            counters: CrawlCounters::new(),
            depths: Mutex::new(HashMap::new()),
            max_depth: config.crawler.max_depth,
        };

        Ok(Self {
            shared: Arc::new(shared),
            seeds,
            blacklist: config.blacklist.iter().map(|e| e.host.clone()).collect(),
            max_pages: config.crawler.max_pages,
            max_concurrent_pages: config.crawler.max_concurrent_pages.max(1) as usize,
            idle_timeout: config.crawler.idle_timeout(),
        })
    }

    /// The filter this coordinator feeds
    pub fn filter(&self) -> &Filter {
        &self.shared.filter
    }

    /// Runs the crawl to completion
    pub async fn run(self) -> Result<CrawlSummary, ShoalError> {
        let started_at = Utc::now();
        let shared = self.shared;
        tracing::info!(
            "Starting crawl: {} seeds, {} blacklisted hosts",
            self.seeds.len(),
            self.blacklist.len()
        );

        // Blacklist first so no seed on a blacklisted host is admitted.
        for host in &self.blacklist {
            shared.filter.blacklist(host).await;
        }
        for seed in self.seeds {
            shared.note_depth(&seed, 0);
            shared.filter.test(seed).await;
        }

        let results = shared.filter.results();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_pages));
        let mut tasks = JoinSet::new();

        loop {
            if shared.counters.dispatched() >= self.max_pages {
                tracing::info!("Reached page limit of {}", self.max_pages);
                break;
            }

            tokio::select! {
                next = results.next() => {
                    let Some(url) = next else {
                        break;
                    };
                    let Ok(permit) = semaphore.clone().acquire_owned().await else {
                        break;
                    };
                    shared.counters.record_dispatch();
                    let depth = shared.depth_of(&url);
                    tasks.spawn(process_page(shared.clone(), url, depth, permit));
                }
                Some(joined) = tasks.join_next() => {
                    if let Err(e) = joined {
                        tracing::error!("Page task failed: {}", e);
                    }
                }
                _ = tokio::time::sleep(self.idle_timeout), if tasks.is_empty() => {
                    tracing::info!("No admissions for {:?}, finishing crawl", self.idle_timeout);
                    break;
                }
            }
        }

        // In-flight pages may still submit links; let them finish first.
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Page task failed: {}", e);
            }
        }

        shared.filter.close().await;
        let mut left_in_frontier = 0;
        while let Some(url) = results.next().await {
            tracing::debug!("Not fetched: {}", url);
            left_in_frontier += 1;
        }
        let filter_summary = shared.filter.join().await.unwrap_or_default();

        let mut summary = CrawlSummary::from_counters(&shared.counters, started_at, Utc::now());
        summary.hosts_resolved = shared.resolver.len();
        summary.left_in_frontier = left_in_frontier;
        summary.filter = filter_summary;

        tracing::info!(
            "Crawl finished: {} pages fetched, {} left in frontier",
            summary.pages_fetched,
            summary.left_in_frontier
        );
        Ok(summary)
    }
}

/// One admitted URL through resolve, download, report and parse
async fn process_page<L: Lookup>(
    shared: Arc<Shared<L>>,
    url: Url,
    depth: u32,
    _permit: OwnedSemaphorePermit,
) {
    let mut record = CrawlRecord::from_url(url).with_depth(depth);
    tracing::debug!("Processing {} at depth {}", record.url(), depth);

    if let Err(e) = resolve_record(&shared.resolver, &mut record).await {
        tracing::warn!("Resolution failed: {}", e);
        shared.counters.record_resolution_failure();
        record.set_error(e.to_string());
        shared
            .filter
            .report_outcome(OutcomeReport::new(record.hostname(), Outcome::ServerError))
            .await;
        return;
    }

    if let Err(e) = shared.downloader.download_into(&mut record).await {
        tracing::warn!("{}", e);
        shared.counters.record_fetch_failure();
        shared.filter.report_outcome(OutcomeReport::from(&record)).await;
        return;
    }

    let report = OutcomeReport::from(&record);
    shared.counters.record_fetch();
    if report.outcome.is_failure() {
        shared.counters.record_server_error();
    }
    shared.filter.report_outcome(report).await;

    let Some(page) = record.page() else {
        return;
    };
    tracing::info!("Fetched {} ({})", record.url(), page.status);

    if !(200..300).contains(&page.status) || !page.is_html() {
        return;
    }
    if depth >= shared.max_depth {
        tracing::debug!("Not following links from {} at max depth", record.url());
        return;
    }

    let mut found = 0;
    let mut submitted = 0;
    for link in extract_links(&record) {
        found += 1;
        if shared.note_depth(&link, depth + 1) {
            submitted += 1;
            shared.filter.test(link).await;
        }
    }
    shared.counters.record_links(found, submitted);
    tracing::debug!("{}: {} links, {} submitted", record.url(), found, submitted);
}

/// Runs a complete crawl with the operating system resolver
pub async fn run_crawl(config: &Config) -> Result<CrawlSummary, ShoalError> {
    Coordinator::new(config)?.run().await
}
