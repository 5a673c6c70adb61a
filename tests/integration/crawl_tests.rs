//! End-to-end crawls against mock sites

use crate::{create_test_config, port_of, LoopbackLookup};
use shoal::config::HostEntry;
use shoal::crawler::Coordinator;
use shoal::resolver::ResolutionCache;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base = format!("http://site.test:{}", port_of(&mock_server.uri()));

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="{base}/page2">Page 2</a>
            <a href="/page1#again">Page 1 again</a>
            <a href="mailto:someone@site.test">Mail</a>
            </body></html>"#
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<a href="/">Home</a><a href="/page3">Deeper</a>"#.to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text, /page3"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Two levels below the seed
    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(vec![format!("{base}/")]);
    config.crawler.max_depth = 1;

    let coordinator =
        Coordinator::with_resolver(&config, ResolutionCache::with_lookup(LoopbackLookup))
            .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_dispatched, 3);
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.fetch_failures, 0);
    assert_eq!(summary.resolution_failures, 0);
    assert_eq!(summary.hosts_resolved, 1);
    assert_eq!(summary.left_in_frontier, 0);
    assert_eq!(summary.filter.hosts, 1);
    assert_eq!(summary.filter.admitted, 3);
}

#[tokio::test]
async fn test_blacklisted_host_is_never_fetched() {
    let mock_server = MockServer::start().await;
    let port = port_of(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<a href="http://blocked.test:{port}/blocked">Blocked</a>
            <a href="http://open.test:{port}/open">Open</a>"#
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/open"))
        .respond_with(html(String::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(vec![format!("http://site.test:{port}/")]);
    config.blacklist = vec![HostEntry {
        host: "Blocked.Test".to_string(),
    }];

    let coordinator =
        Coordinator::with_resolver(&config, ResolutionCache::with_lookup(LoopbackLookup))
            .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.filter.blacklisted, 1);
    assert_eq!(summary.filter.hosts, 3);
}

#[tokio::test]
async fn test_server_errors_are_reported_to_the_filter() {
    let mock_server = MockServer::start().await;
    let base = format!("http://flaky.test:{}", port_of(&mock_server.uri()));

    Mock::given(method("GET"))
        .and(path("/overloaded"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow-down"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(vec![
        format!("{base}/overloaded"),
        format!("{base}/slow-down"),
        format!("{base}/missing"),
    ]);

    let coordinator =
        Coordinator::with_resolver(&config, ResolutionCache::with_lookup(LoopbackLookup))
            .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.server_errors, 2);
    assert_eq!(summary.filter.server_errors, 2);
    assert_eq!(summary.links_discovered, 0);
}

#[tokio::test]
async fn test_connection_failure_counts_as_fetch_failure() {
    // A port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);

    let config = create_test_config(vec![format!("http://gone.test:{port}/")]);

    let coordinator =
        Coordinator::with_resolver(&config, ResolutionCache::with_lookup(LoopbackLookup))
            .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_dispatched, 1);
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.filter.server_errors, 1);
}
