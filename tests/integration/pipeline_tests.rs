//! End-to-end lifecycle: discover, acquire, dispatch, collect

use crate::common::{article_html, listing_html, test_config, FirstListingPage, LISTING_PATH};
use amv_harvest::acquisition::Acquirer;
use amv_harvest::crawler::ListingScraper;
use amv_harvest::dispatch::{dispatch, TorrentClient};
use amv_harvest::library::{check_library, DirectoryScanner};
use amv_harvest::output::load_statistics;
use amv_harvest::selector::{parse_specs, select_ids};
use amv_harvest::state::AmvState;
use amv_harvest::storage::{EntryStore, SqliteStorage};
use amv_harvest::AmvError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingClient {
    received: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl TorrentClient for RecordingClient {
    async fn add(&self, files: &[PathBuf]) -> Result<(), AmvError> {
        self.received.lock().unwrap().extend_from_slice(files);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[tokio::test]
async fn test_full_lifecycle() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());
    let ids = ["09001", "08500", "00400"];

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("in", "cat"))
        .and(FirstListingPage)
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&ids, None)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("in", "cat"))
        .and(query_param("page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[], None)))
        .mount(&server)
        .await;
    for id in ids {
        Mock::given(method("GET"))
            .and(path("/index.php"))
            .and(query_param("in", "view"))
            .and(query_param("id", id))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(article_html(id, &[("hq", "900 Mb")])),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("in", "get"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"d4:infode".to_vec()))
        .mount(&server)
        .await;

    let mut store = SqliteStorage::new(&config.storage.database_path).unwrap();

    // Discover
    let scraper = ListingScraper::new(&config).unwrap();
    let scraped = scraper.scrape_all(&mut store, Some(10)).await.unwrap();
    assert_eq!(scraped.new_count, 3);

    // Acquire
    let acquirer = Acquirer::new(&config).unwrap();
    let acquired = acquirer.acquire_all_pending(&mut store).await.unwrap();
    assert_eq!(acquired.succeeded, 3);

    // Dispatch everything above 500
    let specs = parse_specs(&[">500"]).unwrap();
    let selected = select_ids(&store, &specs, AmvState::Ready).unwrap();
    assert_eq!(selected, vec!["08500", "09001"]);

    let client = RecordingClient::default();
    let summary = dispatch(
        &mut store,
        &client,
        &config.storage.torrent_dir,
        &selected,
        config.client.batch_size,
    )
    .await
    .unwrap();
    assert_eq!(summary.dispatched, 2);
    assert_eq!(client.received.lock().unwrap().len(), 2);

    // Collect
    let library = dir.path().join("library");
    std::fs::create_dir(&library).unwrap();
    std::fs::write(library.join("08500.Some Title.mkv"), b"").unwrap();
    std::fs::write(library.join("00400.Other.mp4"), b"").unwrap();

    let scanner = DirectoryScanner::new(&library, config.library.id_width).unwrap();
    let report = check_library(&mut store, &scanner).unwrap();
    assert_eq!(report.marked, 2);

    let stats = load_statistics(&store).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.count(AmvState::Ready), 0);
    assert_eq!(stats.count(AmvState::Dispatched), 1);
    assert_eq!(stats.count(AmvState::Collected), 2);
    assert_eq!(store.get("09001").unwrap().unwrap().state, AmvState::Dispatched);
}
