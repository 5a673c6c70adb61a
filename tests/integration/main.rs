//! Integration tests for Shoal
//!
//! These tests use wiremock to stand in for the crawled sites. Hostnames are
//! routed to the mock server through a lookup that answers loopback for every
//! name, so the downloader's address pinning is exercised too.

mod crawl_tests;
mod fetch_tests;
mod filter_tests;

use shoal::config::{Config, CrawlerConfig, FilterConfig, UserAgentConfig};
use shoal::resolver::Lookup;
use std::io;
use std::net::{IpAddr, Ipv4Addr};

/// Resolves every hostname to 127.0.0.1
pub struct LoopbackLookup;

impl Lookup for LoopbackLookup {
    async fn lookup(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
        Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
    }
}

/// Creates a test configuration crawling from the given seeds
pub fn create_test_config(seeds: Vec<String>) -> Config {
    Config {
        seeds,
        crawler: CrawlerConfig {
            max_depth: 2,
            max_concurrent_pages: 4,
            max_pages: 100,
            idle_timeout_ms: 300,
            request_timeout_ms: 2_000,
            accept_invalid_certs: false,
        },
        filter: FilterConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        blacklist: vec![],
    }
}

/// The mock server's port
pub fn port_of(uri: &str) -> u16 {
    url::Url::parse(uri)
        .expect("Failed to parse mock server URI")
        .port()
        .expect("Mock server URI has no port")
}
