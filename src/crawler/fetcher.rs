//! Page downloader
//!
//! Fetches a page from the address the resolver already chose. The HTTP
//! client is pinned to that address, so no second DNS lookup happens here.
//! Redirects are not followed: a redirect is a page like any other, and its
//! `Location` is not a link the parser will see.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::record::{CrawlRecord, Downloadable, FetchedPage};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// A failed download
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{host} has no resolved address")]
    Unresolved { host: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Could not connect to {address} for {url}")]
    Connect { url: String, address: SocketAddr },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

/// Downloads pages for crawl records
#[derive(Debug, Clone)]
pub struct Downloader {
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    accept_invalid_certs: bool,
}

impl Downloader {
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Self {
        let timeout = crawler.request_timeout();
        Self {
            user_agent: user_agent.header_value(),
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(10)),
            accept_invalid_certs: crawler.accept_invalid_certs,
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Builds a client that sends every request for `host` to `address`
    fn client_for(&self, host: &str, address: SocketAddr) -> Result<Client, reqwest::Error> {
        Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .resolve(host, address)
            .gzip(true)
            .brotli(true)
            .build()
    }

    /// Downloads the record's URL from its resolved address
    ///
    /// Any HTTP status counts as a download; only transport failures are errors.
    pub async fn download<D>(&self, record: &D) -> Result<FetchedPage, FetchError>
    where
        D: Downloadable + ?Sized,
    {
        let url = record.url().as_str();
        let address = record.socket_addr().ok_or_else(|| FetchError::Unresolved {
            host: record.hostname().to_string(),
        })?;

        let client = self
            .client_for(record.hostname(), address)
            .map_err(FetchError::Client)?;

        tracing::debug!("GET {} via {}", url, address);
        let response = client
            .get(record.url().clone())
            .send()
            .await
            .map_err(|e| classify(url, address, e))?;

        let status = response.status().as_u16();
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify(url, address, e))?
            .to_vec();

        Ok(FetchedPage {
            status,
            headers,
            body,
        })
    }

    /// Downloads into the record, storing either the page or the error text on it
    pub async fn download_into(&self, record: &mut CrawlRecord) -> Result<(), FetchError> {
        match self.download(&*record).await {
            Ok(page) => {
                record.set_page(page);
                Ok(())
            }
            Err(e) => {
                record.set_error(e.to_string());
                Err(e)
            }
        }
    }
}

fn classify(url: &str, address: SocketAddr, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            address,
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
