//! Downloader behaviour against a mock server

use crate::{create_test_config, port_of};
use shoal::crawler::{Downloader, FetchError};
use shoal::record::CrawlRecord;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_downloader() -> Downloader {
    let config = create_test_config(vec![]);
    Downloader::new(&config.crawler, &config.user_agent)
}

/// A record for `path` on a made-up host, pinned to the mock server
fn pinned_record(mock_server: &MockServer, path: &str) -> CrawlRecord {
    let port = port_of(&mock_server.uri());
    let mut record = CrawlRecord::parse(&format!("http://pinned.test:{port}{path}"))
        .expect("Failed to parse record URL");
    record.set_address(IpAddr::V4(Ipv4Addr::LOCALHOST));
    record
}

#[tokio::test]
async fn test_download_populates_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zoo"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-animal", "gorilla")
                .set_body_raw("<html><body>zoo</body></html>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut record = pinned_record(&mock_server, "/zoo");
    create_test_downloader()
        .download_into(&mut record)
        .await
        .expect("Download failed");

    let page = record.page().expect("No page stored");
    assert_eq!(page.status, 200);
    assert_eq!(page.header("X-Animal"), Some("gorilla"));
    assert!(page.is_html());
    assert_eq!(page.body, b"<html><body>zoo</body></html>");
    assert_eq!(record.error(), None);
}

#[tokio::test]
async fn test_redirects_are_not_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let record = pinned_record(&mock_server, "/old");
    let page = create_test_downloader()
        .download(&record)
        .await
        .expect("Download failed");

    assert_eq!(page.status, 301);
    assert_eq!(page.header("location"), Some("/new"));
}

#[tokio::test]
async fn test_server_error_is_still_a_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("broken"))
        .mount(&mock_server)
        .await;

    let record = pinned_record(&mock_server, "/");
    let page = create_test_downloader()
        .download(&record)
        .await
        .expect("Download failed");

    assert_eq!(page.status, 500);
    assert_eq!(page.body, b"broken");
}

#[tokio::test]
async fn test_request_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(vec![]);
    config.crawler.request_timeout_ms = 200;
    let downloader = Downloader::new(&config.crawler, &config.user_agent);

    let mut record = pinned_record(&mock_server, "/slow");
    let err = downloader.download_into(&mut record).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
    assert!(record.error().is_some());
    assert!(!record.has_page());
}
