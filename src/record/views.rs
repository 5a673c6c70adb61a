use crate::record::CrawlRecord;
use std::net::{IpAddr, SocketAddr};
use url::Url;

/// What the resolver stage needs from a record
pub trait Resolvable {
    fn hostname(&self) -> &str;
    fn set_address(&mut self, address: IpAddr);
}

/// What the downloader stage needs from a record
pub trait Downloadable {
    fn url(&self) -> &Url;
    fn hostname(&self) -> &str;
    fn path(&self) -> &str;
    fn port(&self) -> u16;
    fn is_https(&self) -> bool;
    fn socket_addr(&self) -> Option<SocketAddr>;
}

/// What the parser stage needs from a record
pub trait Parseable {
    fn base_url(&self) -> &Url;
    /// The downloaded body, empty if nothing was fetched
    fn body(&self) -> &[u8];
}

impl Resolvable for CrawlRecord {
    fn hostname(&self) -> &str {
        CrawlRecord::hostname(self)
    }

    fn set_address(&mut self, address: IpAddr) {
        CrawlRecord::set_address(self, address)
    }
}

impl Downloadable for CrawlRecord {
    fn url(&self) -> &Url {
        CrawlRecord::url(self)
    }

    fn hostname(&self) -> &str {
        CrawlRecord::hostname(self)
    }

    fn path(&self) -> &str {
        CrawlRecord::path(self)
    }

    fn port(&self) -> u16 {
        CrawlRecord::port(self)
    }

    fn is_https(&self) -> bool {
        CrawlRecord::is_https(self)
    }

    fn socket_addr(&self) -> Option<SocketAddr> {
        CrawlRecord::socket_addr(self)
    }
}

impl Parseable for CrawlRecord {
    fn base_url(&self) -> &Url {
        self.url()
    }

    fn body(&self) -> &[u8] {
        self.page().map(|p| p.body.as_slice()).unwrap_or_default()
    }
}
