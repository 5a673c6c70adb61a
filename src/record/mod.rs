//! Crawl record module
//!
//! One record type travels through the whole pipeline. Each stage only sees
//! the capability it needs through a narrow trait.
//!
//! # Components
//!
//! - `CrawlRecord`: the canonical record (URL, resolved address, fetched page, error)
//! - `FetchedPage`: status, headers and body of a downloaded page
//! - `Resolvable`, `Downloadable`, `Parseable`: per-stage views

mod crawl_record;
mod views;

pub use crawl_record::{CrawlRecord, FetchedPage};
pub use views::{Downloadable, Parseable, Resolvable};
