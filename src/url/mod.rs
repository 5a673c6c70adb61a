//! URL handling module for Shoal
//!
//! This module provides host extraction (the partition key for admission
//! control) and link canonicalization applied before URLs enter the filter.

mod canonical;
mod host;

pub use canonical::{canonicalize_link, parse_seed};
pub use host::{extract_host, normalize_host};
