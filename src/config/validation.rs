use crate::config::types::{Config, CrawlerConfig, FilterConfig, HostEntry, UserAgentConfig};
use crate::url::{normalize_host, parse_seed};
use crate::ConfigError;
use std::net::IpAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seeds(&config.seeds)?;
    validate_crawler_config(&config.crawler)?;
    validate_filter_config(&config.filter)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_blacklist(&config.blacklist)?;
    Ok(())
}

/// Validates seed URLs: at least one, each an http(s) URL with a host
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in seeds {
        parse_seed(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages must be between 1 and 1000, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.idle_timeout_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "idle_timeout_ms must be >= 10ms, got {}ms",
            config.idle_timeout_ms
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    Ok(())
}

/// Validates filter configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.request_buffer < 1 {
        return Err(ConfigError::Validation(
            "request_buffer must be >= 1".to_string(),
        ));
    }

    if config.results_buffer < 1 {
        return Err(ConfigError::Validation(
            "results_buffer must be >= 1".to_string(),
        ));
    }

    if config.backoff_base_ms < 1 {
        return Err(ConfigError::Validation(
            "backoff_base_ms must be >= 1ms".to_string(),
        ));
    }

    if let Some(max) = config.max_backoff_ms {
        if max < config.backoff_base_ms {
            return Err(ConfigError::Validation(format!(
                "max_backoff_ms ({}ms) must not be below backoff_base_ms ({}ms)",
                max, config.backoff_base_ms
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates blacklisted host entries
fn validate_blacklist(entries: &[HostEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        validate_host(&entry.host)?;
    }
    Ok(())
}

/// Validates an exact host name or IP literal (no wildcards, no port)
fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::Validation(
            "Blacklisted host cannot be empty".to_string(),
        ));
    }

    if normalize_host(host).parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::Validation(format!(
            "Host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::Validation(format!(
            "Host '{}' cannot contain consecutive dots",
            host
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Validation(format!("Invalid email format: '{}'", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }

    Ok(())
}
