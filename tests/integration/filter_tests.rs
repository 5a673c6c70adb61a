//! The admission filter through its public API

use shoal::config::FilterConfig;
use shoal::{Filter, Outcome, OutcomeReport};
use std::collections::HashSet;
use tokio::time::{Duration, Instant};
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn test_each_url_is_admitted_once_across_hosts() {
    let filter = Filter::new(&FilterConfig::default());
    let results = filter.results();

    let consumer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(url) = results.next().await {
            seen.push(url.to_string());
        }
        seen
    });

    for _ in 0..3 {
        for host in ["monkeys.com", "apes.com", "lemurs.com"] {
            for page in 0..5 {
                filter.test(url(&format!("http://{host}/{page}"))).await;
            }
        }
    }
    filter.close().await;

    let seen = consumer.await.unwrap();
    let distinct: HashSet<_> = seen.iter().collect();
    assert_eq!(seen.len(), 15);
    assert_eq!(distinct.len(), 15);

    let summary = filter.join().await.expect("No summary");
    assert_eq!(summary.hosts, 3);
    assert_eq!(summary.admitted, 15);
    assert_eq!(summary.duplicates, 30);
}

#[tokio::test(start_paused = true)]
async fn test_failing_host_is_delayed_while_healthy_host_is_not() {
    let filter = Filter::new(&FilterConfig::default());
    let results = filter.results();

    for _ in 0..3 {
        filter
            .report_outcome(OutcomeReport::new("flaky.com", Outcome::ServerError))
            .await;
    }

    let start = Instant::now();
    filter.test(url("http://flaky.com/")).await;
    filter.test(url("http://steady.com/")).await;

    let first = results.next().await.unwrap();
    assert_eq!(first.as_str(), "http://steady.com/");
    assert!(start.elapsed() < Duration::from_millis(5));

    let second = results.next().await.unwrap();
    assert_eq!(second.as_str(), "http://flaky.com/");
    assert!(start.elapsed() >= Duration::from_millis(400));

    filter.close().await;
    assert!(results.next().await.is_none());
}
