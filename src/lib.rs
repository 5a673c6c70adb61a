//! Shoal: a host-partitioned web crawler
//!
//! This crate implements a crawl pipeline (resolve, fetch, parse, filter) whose
//! admission control is partitioned by host: every host gets its own actor that
//! owns the host's seen-URL set, blacklist flag and failure backoff.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod output;
pub mod record;
pub mod resolver;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Shoal operations
#[derive(Debug, Error)]
pub enum ShoalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Resolution failed: {0}")]
    Resolution(#[from] resolver::ResolutionFailure),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Shoal operations
pub type Result<T> = std::result::Result<T, ShoalError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator};
pub use filter::{Filter, FilterSummary, Outcome, OutcomeReport, Results};
pub use output::CrawlSummary;
pub use record::CrawlRecord;
pub use resolver::{ResolutionCache, ResolutionFailure};
pub use url::{canonicalize_link, extract_host};
