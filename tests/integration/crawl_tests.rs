//! Integration tests for listing discovery

use crate::common::{listing_html, test_config, FirstListingPage, LISTING_PATH};
use amv_harvest::crawler::ListingScraper;
use amv_harvest::state::AmvState;
use amv_harvest::storage::{EntryStore, SqliteStorage};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, offset: Option<u32>, body: String, expected: u64) {
    let mock = Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("in", "cat"));
    let mock = match offset {
        Some(offset) => mock.and(query_param("page", offset.to_string())),
        None => mock.and(FirstListingPage),
    };
    mock.respond_with(
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/html; charset=utf-8"),
    )
    .expect(expected)
    .mount(server)
    .await;
}

#[tokio::test]
async fn test_crawl_stops_at_first_empty_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    mount_page(&server, None, listing_html(&["12003", "12002", "12001"], None), 1).await;
    mount_page(&server, Some(10), listing_html(&[], None), 1).await;

    let scraper = ListingScraper::new(&config).expect("Failed to create scraper");
    let mut store = SqliteStorage::new(&config.storage.database_path).expect("Failed to open db");

    let summary = scraper
        .scrape_all(&mut store, Some(10))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.new_count, 3);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.entries_seen, 3);

    let records = store.list(None).expect("Failed to list");
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["12003", "12002", "12001"]);
    assert!(records.iter().all(|r| r.state == AmvState::Discovered));
    assert_eq!(
        records[0].article_url,
        format!("{}/index.php?go=Files&in=view&id=12003", server.uri())
    );
}

#[tokio::test]
async fn test_second_crawl_finds_nothing_new() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    mount_page(&server, None, listing_html(&["500", "499"], None), 2).await;
    mount_page(&server, Some(10), listing_html(&[], None), 2).await;

    let scraper = ListingScraper::new(&config).expect("Failed to create scraper");
    let mut store = SqliteStorage::new(&config.storage.database_path).expect("Failed to open db");

    let first = scraper.scrape_all(&mut store, Some(5)).await.unwrap();
    let second = scraper.scrape_all(&mut store, Some(5)).await.unwrap();

    assert_eq!(first.new_count, 2);
    assert_eq!(second.new_count, 0);
    assert_eq!(second.entries_seen, 2);
    assert_eq!(store.count_total().unwrap(), 2);
}

#[tokio::test]
async fn test_page_cap_is_respected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    mount_page(&server, None, listing_html(&["30", "29"], None), 1).await;
    mount_page(&server, Some(10), listing_html(&["20", "19"], None), 0).await;

    let scraper = ListingScraper::new(&config).unwrap();
    let mut store = SqliteStorage::new(&config.storage.database_path).unwrap();

    let summary = scraper.scrape_all(&mut store, Some(1)).await.unwrap();

    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.new_count, 2);
}

#[tokio::test]
async fn test_estimate_total_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    mount_page(&server, None, listing_html(&["99"], Some(40)), 1).await;

    let scraper = ListingScraper::new(&config).unwrap();
    assert_eq!(scraper.estimate_total_pages().await, Some(5));
}

#[tokio::test]
async fn test_crawl_without_page_cap_uses_estimate() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    // Estimate request plus the crawl itself
    mount_page(&server, None, listing_html(&["21", "20"], Some(10)), 2).await;
    mount_page(&server, Some(10), listing_html(&["11", "10"], Some(10)), 1).await;

    let scraper = ListingScraper::new(&config).unwrap();
    let mut store = SqliteStorage::new(&config.storage.database_path).unwrap();

    let summary = scraper.scrape_all(&mut store, None).await.unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.new_count, 4);
}

#[tokio::test]
async fn test_server_error_ends_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let scraper = ListingScraper::new(&config).unwrap();
    let mut store = SqliteStorage::new(&config.storage.database_path).unwrap();

    assert!(scraper.fetch_page(1).await.is_empty());

    let summary = scraper.scrape_all(&mut store, Some(3)).await;
    assert!(summary.is_ok());
    assert_eq!(store.count_total().unwrap(), 0);
}

#[tokio::test]
async fn test_crawl_continues_when_estimate_fails() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    // The estimate request fails, the crawl's own request to page 1 succeeds
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("in", "cat"))
        .and(FirstListingPage)
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, None, listing_html(&["31", "30", "29"], None), 1).await;
    mount_page(&server, Some(10), listing_html(&[], None), 1).await;

    let scraper = ListingScraper::new(&config).unwrap();
    let mut store = SqliteStorage::new(&config.storage.database_path).unwrap();

    let summary = scraper.scrape_all(&mut store, None).await.unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.new_count, 3);

    let records = store.list(None).unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["31", "30", "29"]);
}
