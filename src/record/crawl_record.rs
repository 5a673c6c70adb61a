use crate::url::extract_host;
use crate::UrlError;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use url::Url;

/// A downloaded page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// Response headers; a header may repeat, so every value is kept
    pub headers: HashMap<String, Vec<String>>,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Returns the first value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.first())
            .map(String::as_str)
    }

    /// Returns true if the server reported an HTML body (or no content type at all)
    pub fn is_html(&self) -> bool {
        match self.header("content-type") {
            Some(ct) => ct.to_ascii_lowercase().contains("text/html"),
            None => true,
        }
    }
}

/// The canonical crawl record
///
/// Created from a URL when it is admitted, then filled in by each stage:
/// the resolver sets `address`, the downloader sets `page` or `error`.
#[derive(Debug, Clone)]
pub struct CrawlRecord {
    url: Url,
    host: String,
    port: u16,
    is_https: bool,
    address: Option<IpAddr>,
    page: Option<FetchedPage>,
    error: Option<String>,
    depth: u32,
}

impl CrawlRecord {
    /// Creates a record for a URL at depth 0
    ///
    /// The port is the explicit URL port, or the scheme default (443 for
    /// `https`, 80 otherwise).
    pub fn from_url(url: Url) -> Self {
        let is_https = url.scheme().to_ascii_lowercase().starts_with("https");
        let port = url.port().unwrap_or(if is_https { 443 } else { 80 });
        let host = extract_host(&url).unwrap_or_default();

        Self {
            url,
            host,
            port,
            is_https,
            address: None,
            page: None,
            error: None,
            depth: 0,
        }
    }

    /// Parses a URL string into a record
    pub fn parse(url: &str) -> Result<Self, UrlError> {
        let url = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
        Ok(Self::from_url(url))
    }

    /// Sets the crawl depth (number of hops from a seed)
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The lowercase host name, empty if the URL has none
    pub fn hostname(&self) -> &str {
        &self.host
    }

    /// The request path; `/` when the URL path is empty
    pub fn path(&self) -> &str {
        match self.url.path() {
            "" => "/",
            p => p,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_https(&self) -> bool {
        self.is_https
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn address(&self) -> Option<IpAddr> {
        self.address
    }

    pub fn set_address(&mut self, address: IpAddr) {
        self.address = Some(address);
    }

    /// The resolved address combined with the port, once resolution has run
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.address.map(|ip| SocketAddr::new(ip, self.port))
    }

    pub fn page(&self) -> Option<&FetchedPage> {
        self.page.as_ref()
    }

    pub fn has_page(&self) -> bool {
        self.page.is_some()
    }

    pub fn set_page(&mut self, page: FetchedPage) {
        self.page = Some(page);
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_socket_addr_with_explicit_port() {
        let mut r = CrawlRecord::parse("https://monkeys.com:65535/pie.html").unwrap();
        r.set_address(IpAddr::V4(Ipv4Addr::new(2, 2, 2, 2)));
        assert_eq!(r.socket_addr().unwrap().to_string(), "2.2.2.2:65535");
    }

    #[test]
    fn test_socket_addr_default_ports() {
        let mut r = CrawlRecord::parse("http://monkeys.com/pie.html").unwrap();
        r.set_address(IpAddr::V4(Ipv4Addr::new(2, 2, 2, 2)));
        assert_eq!(r.socket_addr().unwrap().to_string(), "2.2.2.2:80");

        let mut r = CrawlRecord::parse("https://monkeys.com/pie.html").unwrap();
        r.set_address(IpAddr::V4(Ipv4Addr::new(2, 2, 2, 2)));
        assert_eq!(r.socket_addr().unwrap().to_string(), "2.2.2.2:443");
    }

    #[test]
    fn test_socket_addr_before_resolution() {
        let r = CrawlRecord::parse("http://monkeys.com/").unwrap();
        assert!(r.socket_addr().is_none());
    }

    #[test]
    fn test_parse_fields() {
        let r = CrawlRecord::parse("https://monkeys.com:3444/banana/pie.html").unwrap();
        assert_eq!(r.hostname(), "monkeys.com");
        assert_eq!(r.path(), "/banana/pie.html");
        assert_eq!(r.port(), 3444);
        assert!(r.is_https());
        assert!(!r.has_page());
        assert_eq!(r.depth(), 0);
    }

    #[test]
    fn test_root_path() {
        let r = CrawlRecord::parse("http://pie.com").unwrap();
        assert_eq!(r.path(), "/");
    }

    #[test]
    fn test_url_round_trip() {
        let r = CrawlRecord::parse("https://banana.com/pie/apple/orange.html").unwrap();
        assert_eq!(r.url().as_str(), "https://banana.com/pie/apple/orange.html");
    }

    #[test]
    fn test_set_page() {
        let mut r = CrawlRecord::parse("https://monkeys.com").unwrap();
        let mut headers = HashMap::new();
        headers.insert(
            "foo".to_string(),
            vec!["bar".to_string(), "2".to_string()],
        );
        r.set_page(FetchedPage {
            status: 200,
            headers: headers.clone(),
            body: b"This is some body text".to_vec(),
        });

        assert!(r.has_page());
        let page = r.page().unwrap();
        assert_eq!(page.body, b"This is some body text");
        assert_eq!(page.headers.get("foo"), headers.get("foo"));
        assert_eq!(page.header("FOO"), Some("bar"));
    }

    #[test]
    fn test_set_error() {
        let mut r = CrawlRecord::parse("http://monkeys.com").unwrap();
        assert!(r.error().is_none());
        r.set_error("connection refused");
        assert_eq!(r.error(), Some("connection refused"));
    }

    #[test]
    fn test_is_html() {
        let mut page = FetchedPage::default();
        assert!(page.is_html());

        page.headers.insert(
            "Content-Type".to_string(),
            vec!["text/html; charset=utf-8".to_string()],
        );
        assert!(page.is_html());

        page.headers.insert(
            "Content-Type".to_string(),
            vec!["application/pdf".to_string()],
        );
        assert!(!page.is_html());
    }

    #[test]
    fn test_ipv6_literal_hostname() {
        let mut record = CrawlRecord::parse("http://[::1]:8080/").unwrap();
        assert_eq!(record.hostname(), "::1");

        record.set_address("::1".parse().unwrap());
        assert_eq!(record.socket_addr().unwrap().to_string(), "[::1]:8080");
    }

    #[test]
    fn test_with_depth() {
        let r = CrawlRecord::parse("http://pie.com/").unwrap().with_depth(3);
        assert_eq!(r.depth(), 3);
    }
}
