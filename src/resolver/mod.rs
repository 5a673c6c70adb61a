//! Hostname resolution module
//!
//! This module provides the resolution cache shared by every crawl worker and
//! the resolver stage that fills in a record's address.

mod cache;
mod lookup;

pub use cache::ResolutionCache;
pub use lookup::{Lookup, SystemLookup};

use crate::record::Resolvable;
use std::net::IpAddr;
use thiserror::Error;

/// A failed hostname lookup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{hostname}: {cause}")]
pub struct ResolutionFailure {
    /// The hostname that could not be resolved
    pub hostname: String,

    /// Why the lookup failed
    pub cause: String,
}

impl ResolutionFailure {
    pub fn new(hostname: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            cause: cause.into(),
        }
    }
}

/// Resolves a record's hostname through the cache and stores the address on it
///
/// # Returns
///
/// * `Ok(IpAddr)` - The address now set on the record
/// * `Err(ResolutionFailure)` - The lookup failed; the record is left untouched
pub async fn resolve_record<L, R>(
    cache: &ResolutionCache<L>,
    record: &mut R,
) -> Result<IpAddr, ResolutionFailure>
where
    L: Lookup,
    R: Resolvable + ?Sized,
{
    let address = cache.resolve(record.hostname()).await?;
    record.set_address(address);
    Ok(address)
}
