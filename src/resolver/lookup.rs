use std::future::Future;
use std::io;
use std::net::IpAddr;

/// An external hostname lookup
///
/// The resolution cache calls this on a miss. Tests substitute their own
/// implementation to count calls or inject failures.
pub trait Lookup: Send + Sync {
    /// Returns every address the hostname resolves to, in preference order
    fn lookup(&self, host: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send;
}

/// Lookup through the operating system resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl Lookup for SystemLookup {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|a| a.ip()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_lookup_ip_literal() {
        // IP literals are answered without touching the network
        let addrs = SystemLookup.lookup("127.0.0.1").await.unwrap();
        assert_eq!(addrs, vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);
    }
}
