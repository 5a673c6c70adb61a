use crate::filter::{BackoffPolicy, Outcome};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

/// Backoff deadlines never exceed this far in the future
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// Why an admission request produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The host is blacklisted
    Blacklisted,
    /// This exact URL string was already admitted for the host
    Duplicate,
}

/// The decision for one admission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Emit the URL, no earlier than `not_before` if set
    Emit { not_before: Option<Instant> },
    /// Silently discard the URL
    Drop(DropReason),
}

/// Admission-control state for one host
///
/// Owned by exactly one host actor, so none of it is behind a lock.
///
/// # States
///
/// - Active: no consecutive failures, URLs are emitted immediately
/// - Backoff: after a server error, emissions are held until `backoff_until`,
///   and every emission while failing pushes the window out by the current delay
/// - Blacklisted: terminal, nothing is ever emitted again
#[derive(Debug, Clone)]
pub struct HostState {
    /// Every URL ever admitted for this host; exact-string, append-only
    seen: HashSet<String>,

    /// Permanent suppression flag
    blacklisted: bool,

    /// Server errors reported since the last success
    consecutive_failures: u32,

    /// Emissions are held until this instant
    backoff_until: Option<Instant>,

    policy: BackoffPolicy,
}

impl HostState {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            seen: HashSet::new(),
            blacklisted: false,
            consecutive_failures: 0,
            backoff_until: None,
            policy,
        }
    }

    /// Decides whether a URL is admitted
    ///
    /// A URL that is admitted is recorded as seen immediately, even if its
    /// emission is held by a backoff window.
    pub fn admit(&mut self, url: &str, now: Instant) -> Admission {
        if self.blacklisted {
            return Admission::Drop(DropReason::Blacklisted);
        }

        if self.seen.contains(url) {
            return Admission::Drop(DropReason::Duplicate);
        }
        self.seen.insert(url.to_string());

        let emit_at = match self.backoff_until {
            Some(until) if until > now => until,
            _ => now,
        };

        // Space out further emissions while the host keeps failing
        if self.consecutive_failures > 0 {
            self.backoff_until = Some(deadline(emit_at, self.admission_delay()));
        }

        Admission::Emit {
            not_before: (emit_at > now).then_some(emit_at),
        }
    }

    /// Applies a fetch outcome
    ///
    /// A server error only affects admissions decided after it; it never
    /// shortens a window that is already open.
    pub fn report(&mut self, outcome: Outcome, now: Instant) {
        match outcome {
            Outcome::Success => {
                self.consecutive_failures = 0;
                self.backoff_until = None;
            }
            Outcome::ServerError => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                let until = deadline(now, self.admission_delay());
                self.backoff_until = Some(match self.backoff_until {
                    Some(existing) => existing.max(until),
                    None => until,
                });
            }
        }
    }

    /// Permanently suppresses admission; idempotent
    pub fn blacklist(&mut self) {
        self.blacklisted = true;
    }

    pub fn is_blacklisted(&self) -> bool {
        self.blacklisted
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// The current delay derived from the consecutive failure count
    pub fn admission_delay(&self) -> Duration {
        self.policy.delay_for(self.consecutive_failures)
    }

    pub fn backoff_until(&self) -> Option<Instant> {
        self.backoff_until
    }

    /// True while a backoff window is open at `now`
    pub fn in_backoff(&self, now: Instant) -> bool {
        matches!(self.backoff_until, Some(until) if until > now)
    }

    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl Default for HostState {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}

fn deadline(from: Instant, delay: Duration) -> Instant {
    from.checked_add(delay.min(FAR_FUTURE))
        .unwrap_or(from)
}
