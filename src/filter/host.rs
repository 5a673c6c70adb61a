//! Host actor: the single sequential owner of one host's admission state

use crate::filter::{BackoffPolicy, Outcome};
use crate::state::{Admission, DropReason, HostState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use url::Url;

/// Events routed to a host actor, applied strictly in arrival order
#[derive(Debug)]
pub(crate) enum HostEvent {
    Admit(Url),
    Report(Outcome),
    Blacklist,
}

/// What one host actor did over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostSummary {
    pub admitted: u64,
    pub duplicates: u64,
    pub blacklisted: u64,
    pub server_errors: u64,
}

/// The router's side of a host actor
///
/// The mailbox is unbounded so that a host holding URLs in backoff never
/// blocks the router; the backlog stays with the host that caused it.
pub(crate) struct HostHandle {
    mailbox: mpsc::UnboundedSender<HostEvent>,
    task: JoinHandle<HostSummary>,
}

impl HostHandle {
    pub(crate) fn spawn(host: String, policy: BackoffPolicy, results: mpsc::Sender<Url>) -> Self {
        let (mailbox, inbox) = mpsc::unbounded_channel();
        tracing::debug!("Starting actor for host {}", host);
        let task = tokio::spawn(run_host(host, inbox, results, HostState::new(policy)));
        Self { mailbox, task }
    }

    /// Hands an event to the actor without waiting
    pub(crate) fn send(&self, event: HostEvent) {
        if let Err(e) = self.mailbox.send(event) {
            tracing::warn!("Host actor has stopped; dropping {:?}", e.0);
        }
    }

    /// Closes the mailbox; the actor drains what is queued, then finishes
    pub(crate) fn close(self) -> JoinHandle<HostSummary> {
        drop(self.mailbox);
        self.task
    }
}

async fn run_host(
    host: String,
    mut inbox: mpsc::UnboundedReceiver<HostEvent>,
    results: mpsc::Sender<Url>,
    mut state: HostState,
) -> HostSummary {
    let mut summary = HostSummary::default();

    while let Some(event) = inbox.recv().await {
        match event {
            HostEvent::Admit(url) => match state.admit(url.as_str(), Instant::now()) {
                Admission::Emit { not_before } => {
                    if let Some(deadline) = not_before {
                        tracing::debug!(
                            "Holding {} for {:?} ({} consecutive failures on {})",
                            url,
                            deadline.saturating_duration_since(Instant::now()),
                            state.consecutive_failures(),
                            host
                        );
                        sleep_until(deadline).await;
                    }

                    if results.send(url).await.is_err() {
                        tracing::warn!("Results stream dropped; host {} stops emitting", host);
                        break;
                    }
                    summary.admitted += 1;
                }
                Admission::Drop(DropReason::Duplicate) => {
                    tracing::trace!("Duplicate URL dropped: {}", url);
                    summary.duplicates += 1;
                }
                Admission::Drop(DropReason::Blacklisted) => {
                    tracing::trace!("Blacklisted host {}, dropped: {}", host, url);
                    summary.blacklisted += 1;
                }
            },

            HostEvent::Report(outcome) => {
                state.report(outcome, Instant::now());
                if outcome.is_failure() {
                    summary.server_errors += 1;
                    tracing::debug!(
                        "Host {} failed {} time(s) in a row, admission delay now {:?}",
                        host,
                        state.consecutive_failures(),
                        state.admission_delay()
                    );
                }
            }

            HostEvent::Blacklist => {
                if !state.is_blacklisted() {
                    tracing::info!("Blacklisting host {}", host);
                }
                state.blacklist();
            }
        }
    }

    tracing::trace!("Actor for host {} finished: {:?}", host, summary);
    summary
}
