use url::{Host, Url};

/// Extracts the host partition key from a URL
///
/// The key is the host portion of the URL in lowercase, without the port.
/// Two URLs that differ only by port share a host actor. IPv6 literals lose
/// their brackets, so the key is also a valid lookup name.
///
/// # Returns
///
/// * `Some(String)` - The lowercase host
/// * `None` - If the URL has no host (e.g. `mailto:` or `data:` URLs)
///
/// # Examples
///
/// ```
/// use url::Url;
/// use shoal::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.com:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), None);
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(d) if d.is_empty() => None,
        Host::Domain(d) => Some(d.to_lowercase()),
        Host::Ipv4(a) => Some(a.to_string()),
        Host::Ipv6(a) => Some(a.to_string()),
    }
}

/// Normalizes a host given by name (blacklist entries, outcome reports)
///
/// Trims, lowercases and strips IPv6 brackets so the result matches
/// [`extract_host`] for the same host.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.to_lowercase()
}
