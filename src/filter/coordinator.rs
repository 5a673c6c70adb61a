//! Filter coordinator: routes admission requests, outcome reports and
//! blacklist commands to per-host actors
//!
//! The coordinator is a single router task. It owns the map from host to
//! actor, so the map needs no lock; it never waits on a host actor, so a
//! backlogged host cannot stall routing for any other host.

use crate::config::FilterConfig;
use crate::filter::host::{HostEvent, HostHandle, HostSummary};
use crate::filter::{BackoffPolicy, OutcomeReport};
use crate::url::{extract_host, normalize_host};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

#[derive(Debug)]
enum Command {
    Test(Url),
    Report(OutcomeReport),
    Blacklist(String),
    Close,
}

/// Totals across every host actor, available once the filter has drained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// Distinct hosts that got an actor
    pub hosts: usize,
    pub admitted: u64,
    pub duplicates: u64,
    pub blacklisted: u64,
    pub server_errors: u64,
    /// URLs dropped because they had no host
    pub unroutable: u64,
}

impl FilterSummary {
    fn absorb(&mut self, host: HostSummary) {
        self.admitted += host.admitted;
        self.duplicates += host.duplicates;
        self.blacklisted += host.blacklisted;
        self.server_errors += host.server_errors;
    }
}

/// The stream of admitted URLs
///
/// Ordered per host, not globally. Ends only after the filter has been
/// closed and every host actor has drained. Clones share one stream, so each
/// URL is delivered to exactly one consumer.
#[derive(Clone)]
pub struct Results {
    inner: Arc<tokio::sync::Mutex<mpsc::Receiver<Url>>>,
}

impl Results {
    /// Waits for the next admitted URL; `None` once the filter has fully drained
    pub async fn next(&self) -> Option<Url> {
        self.inner.lock().await.recv().await
    }
}

/// Handle to the admission filter
///
/// Cloning is cheap; every clone talks to the same router. Must be created
/// inside a Tokio runtime.
///
/// # Example
///
/// ```no_run
/// use shoal::config::FilterConfig;
/// use shoal::filter::Filter;
/// use url::Url;
///
/// # async fn example() {
/// let filter = Filter::new(&FilterConfig::default());
/// let results = filter.results();
///
/// filter.test(Url::parse("http://a.com/x").unwrap()).await;
/// filter.test(Url::parse("http://a.com/x").unwrap()).await;
/// filter.close().await;
///
/// while let Some(url) = results.next().await {
///     println!("admitted {}", url); // printed once
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct Filter {
    commands: mpsc::Sender<Command>,
    results: Results,
    router: Arc<Mutex<Option<JoinHandle<FilterSummary>>>>,
}

impl Filter {
    /// Creates a filter and starts its router task
    pub fn new(config: &FilterConfig) -> Self {
        let (commands, inbox) = mpsc::channel(config.request_buffer.max(1));
        let (results_tx, results_rx) = mpsc::channel(config.results_buffer.max(1));

        let router = Router {
            hosts: HashMap::new(),
            results: results_tx,
            policy: BackoffPolicy::from_config(config),
            unroutable: 0,
        };
        let task = tokio::spawn(router.run(inbox));

        Self {
            commands,
            results: Results {
                inner: Arc::new(tokio::sync::Mutex::new(results_rx)),
            },
            router: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Submits a URL for admission
    ///
    /// Waits only while the router's inbound queue is full. Duplicates and
    /// blacklisted hosts are dropped silently; URLs without a host are dropped
    /// at the router.
    pub async fn test(&self, url: Url) {
        self.send(Command::Test(url)).await;
    }

    /// Reports a fetch outcome to the host it happened on
    pub async fn report_outcome(&self, report: OutcomeReport) {
        self.send(Command::Report(report)).await;
    }

    /// Permanently suppresses admission for a host
    pub async fn blacklist(&self, host: &str) {
        self.send(Command::Blacklist(normalize_host(host))).await;
    }

    /// Signals that no further requests will arrive
    ///
    /// Everything queued before the close is still processed and emitted; the
    /// results stream ends once every host actor has drained.
    pub async fn close(&self) {
        self.send(Command::Close).await;
    }

    /// The stream of admitted URLs
    pub fn results(&self) -> Results {
        self.results.clone()
    }

    /// Waits until the router and every host actor have finished
    ///
    /// Returns the summary to the first caller only.
    pub async fn join(&self) -> Option<FilterSummary> {
        let task = self
            .router
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()?;

        match task.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::error!("Filter router failed: {}", e);
                None
            }
        }
    }

    async fn send(&self, command: Command) {
        if let Err(e) = self.commands.send(command).await {
            tracing::warn!("Filter is closed; ignoring {:?}", e.0);
        }
    }
}

struct Router {
    hosts: HashMap<String, HostHandle>,
    results: mpsc::Sender<Url>,
    policy: BackoffPolicy,
    unroutable: u64,
}

impl Router {
    async fn run(mut self, mut inbox: mpsc::Receiver<Command>) -> FilterSummary {
        while let Some(command) = inbox.recv().await {
            match command {
                Command::Test(url) => match extract_host(&url) {
                    Some(host) => self.route(host, HostEvent::Admit(url)),
                    None => {
                        tracing::debug!("Dropping URL without a host: {}", url);
                        self.unroutable += 1;
                    }
                },
                Command::Report(report) => {
                    self.route(report.host, HostEvent::Report(report.outcome))
                }
                Command::Blacklist(host) => self.route(host, HostEvent::Blacklist),
                Command::Close => {
                    tracing::debug!("Filter closing with {} host actors", self.hosts.len());
                    break;
                }
            }
        }

        inbox.close();
        while let Ok(command) = inbox.try_recv() {
            tracing::warn!("Filter is closed; ignoring {:?}", command);
        }

        self.shutdown().await
    }

    /// Hands an event to the host's actor, creating the actor on first use
    fn route(&mut self, host: String, event: HostEvent) {
        if host.is_empty() {
            tracing::debug!("Ignoring {:?} for an empty host", event);
            return;
        }

        let policy = self.policy;
        let results = &self.results;
        self.hosts
            .entry(host)
            .or_insert_with_key(|host| HostHandle::spawn(host.clone(), policy, results.clone()))
            .send(event);
    }

    async fn shutdown(self) -> FilterSummary {
        let mut summary = FilterSummary {
            hosts: self.hosts.len(),
            unroutable: self.unroutable,
            ..FilterSummary::default()
        };

        // Host actors hold the remaining results senders; the stream ends
        // when the last of them finishes.
        drop(self.results);

        let tasks: Vec<_> = self
            .hosts
            .into_iter()
            .map(|(host, handle)| (host, handle.close()))
            .collect();

        for (host, task) in tasks {
            match task.await {
                Ok(host_summary) => summary.absorb(host_summary),
                Err(e) => tracing::error!("Actor for host {} failed: {}", host, e),
            }
        }

        tracing::debug!("Filter drained: {:?}", summary);
        summary
    }
}
