use crate::record::CrawlRecord;
use crate::url::{extract_host, normalize_host};
use url::Url;

/// The result of a fetch, as far as admission control cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The host answered normally
    Success,
    /// Transport failure, 5xx, or 429; the host should be backed off
    ServerError,
}

impl Outcome {
    /// Classifies an HTTP status code
    ///
    /// 5xx and 429 count against the host. Everything else, 4xx included,
    /// means the host is answering and resets its failure count.
    pub fn from_status(status: u16) -> Self {
        if status >= 500 || status == 429 {
            Self::ServerError
        } else {
            Self::Success
        }
    }

    /// Classifies a record after the download stage
    pub fn from_record(record: &CrawlRecord) -> Self {
        if record.error().is_some() {
            return Self::ServerError;
        }
        match record.page() {
            Some(page) => Self::from_status(page.status),
            None => Self::ServerError,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ServerError)
    }
}

/// An outcome addressed to the host it happened on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeReport {
    pub host: String,
    pub outcome: Outcome,
}

impl OutcomeReport {
    pub fn new(host: &str, outcome: Outcome) -> Self {
        Self {
            host: normalize_host(host),
            outcome,
        }
    }

    /// Addresses an outcome to a URL's host; `None` if the URL has no host
    pub fn for_url(url: &Url, outcome: Outcome) -> Option<Self> {
        extract_host(url).map(|host| Self { host, outcome })
    }
}

impl From<&CrawlRecord> for OutcomeReport {
    fn from(record: &CrawlRecord) -> Self {
        Self::new(record.hostname(), Outcome::from_record(record))
    }
}
