//! Admission filter
//!
//! Decides which discovered URLs may be fetched. State is partitioned by host:
//! each distinct host gets one actor that owns its seen-URL set, blacklist
//! flag and failure backoff, and applies events for that host one at a time.
//!
//! - `Filter`: the handle (`test`, `report_outcome`, `blacklist`, `close`, `results`)
//! - `Results`: the stream of admitted URLs
//! - `Outcome` / `OutcomeReport`: fetch results fed back into a host's backoff
//! - `BackoffPolicy`: failures to admission delay

mod backoff;
mod coordinator;
mod host;
mod outcome;

pub use backoff::BackoffPolicy;
pub use coordinator::{Filter, FilterSummary, Results};
pub use host::HostSummary;
pub use outcome::{Outcome, OutcomeReport};
