//! Concurrent memoizing hostname lookup
//!
//! Entries are created on the first successful lookup and never expire.
//! Concurrent first lookups of the same hostname share a single external call;
//! a failed lookup leaves the entry empty so a later call can still fill it.

use crate::resolver::{Lookup, ResolutionFailure, SystemLookup};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type Entry = Arc<OnceCell<IpAddr>>;

/// Hostname to address cache shared by all crawl workers
///
/// The map lock is only held long enough to find or insert an entry; the
/// lookup itself runs outside it, serialized per hostname by the entry.
pub struct ResolutionCache<L = SystemLookup> {
    lookup: L,
    entries: Mutex<HashMap<String, Entry>>,
}

impl ResolutionCache<SystemLookup> {
    /// Creates a cache backed by the operating system resolver
    pub fn new() -> Self {
        Self::with_lookup(SystemLookup)
    }
}

impl Default for ResolutionCache<SystemLookup> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Lookup> ResolutionCache<L> {
    /// Creates a cache backed by a custom lookup
    pub fn with_lookup(lookup: L) -> Self {
        Self {
            lookup,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves a hostname, performing an external lookup only on a miss
    ///
    /// Hostnames are matched case-insensitively. The first address returned by
    /// the lookup is the one stored.
    ///
    /// # Returns
    ///
    /// * `Ok(IpAddr)` - Cached or freshly resolved address
    /// * `Err(ResolutionFailure)` - Empty hostname, lookup error, or no addresses
    pub async fn resolve(&self, hostname: &str) -> Result<IpAddr, ResolutionFailure> {
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return Err(ResolutionFailure::new(hostname, "empty hostname"));
        }

        let entry = self.entry(hostname);
        if let Some(address) = entry.get() {
            tracing::trace!("Resolution cache hit for {}", hostname);
            return Ok(*address);
        }

        let address = entry
            .get_or_try_init(|| async {
                tracing::debug!("Resolving {}", hostname);
                let addresses = self
                    .lookup
                    .lookup(hostname)
                    .await
                    .map_err(|e| ResolutionFailure::new(hostname, e.to_string()))?;

                addresses
                    .first()
                    .copied()
                    .ok_or_else(|| ResolutionFailure::new(hostname, "no addresses found"))
            })
            .await?;

        Ok(*address)
    }

    /// Returns the cached address without performing a lookup
    pub fn cached(&self, hostname: &str) -> Option<IpAddr> {
        let key = hostname.trim().to_lowercase();
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(&key).and_then(|cell| cell.get().copied())
    }

    /// Number of hostnames with a stored address
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, hostname: &str) -> Entry {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(hostname.to_lowercase())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}
