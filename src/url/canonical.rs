use crate::UrlError;
use url::Url;

/// Canonicalizes a discovered link before it is submitted for admission
///
/// Canonicalization is deliberately light. Admission dedup is exact-string, so
/// query strings and trailing slashes are preserved and stay distinct URLs.
///
/// # Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host
/// 4. Drop the fragment (it never reaches the server)
///
/// # Examples
///
/// ```
/// use shoal::url::canonicalize_link;
///
/// let url = canonicalize_link("http://A.com/page/#top").unwrap();
/// assert_eq!(url.as_str(), "http://a.com/page/");
/// ```
pub fn canonicalize_link(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Parses a seed URL from configuration
///
/// Seeds follow the same rules as discovered links.
pub fn parse_seed(seed: &str) -> Result<Url, UrlError> {
    canonicalize_link(seed)
}

pub(crate) fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);
    Ok(url)
}
