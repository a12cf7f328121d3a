//! Integration tests for torrent acquisition

use crate::common::{article_html, test_config};
use amv_harvest::acquisition::{AcquireSummary, Acquirer};
use amv_harvest::config::Config;
use amv_harvest::resolver::{select_best, DownloadResolver, SizeAnnotationLookup};
use amv_harvest::state::AmvState;
use amv_harvest::storage::{EntryStore, SqliteStorage};
use scraper::ElementRef;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TORRENT_BYTES: &[u8] = b"d8:announce20:http://tracker/announce4:infod4:name5:test.ee";

fn article_url(server: &MockServer, id: &str) -> String {
    format!("{}/index.php?go=Files&in=view&id={}", server.uri(), id)
}

async fn mount_article(server: &MockServer, id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("in", "view"))
        .and(query_param("id", id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_torrent(server: &MockServer, id: &str, file: &str, status: u16, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("in", "get"))
        .and(query_param("id", id))
        .and(query_param("file", file))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_bytes(TORRENT_BYTES)
                .insert_header("content-type", "application/x-bittorrent"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

fn open_store(config: &Config, ids: &[(&str, String)]) -> SqliteStorage {
    let mut store = SqliteStorage::new(&config.storage.database_path).expect("Failed to open db");
    for (id, url) in ids {
        store.insert_if_absent(id, url).expect("Failed to insert");
    }
    store
}

#[tokio::test]
async fn test_acquire_picks_largest_torrent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    mount_article(
        &server,
        "12345",
        article_html("12345", &[("lq", "140.99 Mb"), ("hq", "1.5 Gb"), ("mq", "394.2 Мб")]),
    )
    .await;
    mount_torrent(&server, "12345", "hq", 200, 1).await;
    mount_torrent(&server, "12345", "lq", 200, 0).await;
    mount_torrent(&server, "12345", "mq", 200, 0).await;

    let mut store = open_store(&config, &[("12345", article_url(&server, "12345"))]);
    let acquirer = Acquirer::new(&config).unwrap();

    assert!(acquirer.acquire(&mut store, "12345").await.unwrap());

    let record = store.get("12345").unwrap().unwrap();
    assert_eq!(record.state, AmvState::Ready);
    assert_eq!(record.file_reference.as_deref(), Some("12345.torrent"));

    let stored = std::fs::read(config.storage.torrent_dir.join("12345.torrent")).unwrap();
    assert_eq!(stored, TORRENT_BYTES);
}

#[tokio::test]
async fn test_failed_download_leaves_record_untouched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    mount_article(&server, "777", article_html("777", &[("hq", "700 Mb")])).await;
    mount_torrent(&server, "777", "hq", 404, 1).await;

    let mut store = open_store(&config, &[("777", article_url(&server, "777"))]);
    let acquirer = Acquirer::new(&config).unwrap();

    assert!(!acquirer.acquire(&mut store, "777").await.unwrap());

    let record = store.get("777").unwrap().unwrap();
    assert_eq!(record.state, AmvState::Discovered);
    assert_eq!(record.file_reference, None);
    assert!(!config.storage.torrent_dir.join("777.torrent").exists());
}

#[tokio::test]
async fn test_article_without_torrents_fails() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    mount_article(&server, "5", article_html("5", &[])).await;

    let mut store = open_store(&config, &[("5", article_url(&server, "5"))]);
    let acquirer = Acquirer::new(&config).unwrap();

    assert!(!acquirer.acquire(&mut store, "5").await.unwrap());
    assert_eq!(store.get("5").unwrap().unwrap().state, AmvState::Discovered);
}

#[tokio::test]
async fn test_unreachable_article_fails() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut store = open_store(&config, &[("6", article_url(&server, "6"))]);
    let acquirer = Acquirer::new(&config).unwrap();

    assert!(!acquirer.acquire(&mut store, "6").await.unwrap());
    assert_eq!(store.get("6").unwrap().unwrap().state, AmvState::Discovered);
}

#[tokio::test]
async fn test_acquire_all_pending_continues_past_failures() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    for id in ["30", "20", "10"] {
        mount_article(&server, id, article_html(id, &[("hq", "1 Gb")])).await;
    }
    mount_torrent(&server, "30", "hq", 200, 1).await;
    mount_torrent(&server, "20", "hq", 500, 1).await;
    mount_torrent(&server, "10", "hq", 200, 1).await;

    let mut store = open_store(
        &config,
        &[
            ("10", article_url(&server, "10")),
            ("20", article_url(&server, "20")),
            ("30", article_url(&server, "30")),
        ],
    );
    // Already ready, must not be fetched again
    store.insert_if_absent("40", &article_url(&server, "40")).unwrap();
    store.mark_ready("40", "40.torrent").unwrap();

    let acquirer = Acquirer::new(&config).unwrap();
    let summary = acquirer.acquire_all_pending(&mut store).await.unwrap();

    assert_eq!(
        summary,
        AcquireSummary {
            attempted: 3,
            succeeded: 2,
            failed: 1
        }
    );
    assert_eq!(store.get("10").unwrap().unwrap().state, AmvState::Ready);
    assert_eq!(store.get("20").unwrap().unwrap().state, AmvState::Discovered);
    assert_eq!(store.get("30").unwrap().unwrap().state, AmvState::Ready);
}

#[tokio::test]
async fn test_acquire_leaves_later_states_alone() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    let mut store = open_store(&config, &[]);
    for (id, state) in [("4", AmvState::Dispatched), ("5", AmvState::Collected)] {
        mount_article(&server, id, article_html(id, &[("hq", "1 Gb")])).await;
        mount_torrent(&server, id, "hq", 200, 0).await;
        store.insert_if_absent(id, &article_url(&server, id)).unwrap();
        store.set_state(id, state).unwrap();
    }

    let acquirer = Acquirer::new(&config).unwrap();

    for (id, state) in [("4", AmvState::Dispatched), ("5", AmvState::Collected)] {
        assert!(!acquirer.acquire(&mut store, id).await.unwrap());

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.state, state);
        assert_eq!(record.file_reference, None);
    }
    assert!(!config.storage.torrent_dir.exists());
}

#[tokio::test]
async fn test_unwritable_torrent_dir_leaves_record_untouched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = test_config(&server.uri(), dir.path());

    // A regular file where the torrent directory's parent should be
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    config.storage.torrent_dir = blocker.join("torrent-files");

    mount_article(&server, "9", article_html("9", &[("hq", "1 Gb")])).await;
    mount_torrent(&server, "9", "hq", 200, 1).await;

    let mut store = open_store(&config, &[("9", article_url(&server, "9"))]);
    let acquirer = Acquirer::new(&config).unwrap();

    assert!(!acquirer.acquire(&mut store, "9").await.unwrap());

    let record = store.get("9").unwrap().unwrap();
    assert_eq!(record.state, AmvState::Discovered);
    assert_eq!(record.file_reference, None);
    assert!(blocker.is_file());
}

/// Reads the size from a `data-size` attribute on the link itself
struct DataAttributeLookup;

impl SizeAnnotationLookup for DataAttributeLookup {
    fn size_text(&self, link: &ElementRef<'_>) -> Option<String> {
        link.value().attr("data-size").map(str::to_string)
    }
}

#[tokio::test]
async fn test_resolver_with_alternate_layout() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&server.uri(), dir.path());

    let body = r#"<html><body><ul>
        <li><a data-size="2 Gb" href="/index.php?go=Files&in=get&id=8&file=a">torrent A</a></li>
        <li><a data-size="3 Gb" href="/index.php?go=Files&in=get&id=8&file=b">torrent B</a></li>
        </ul></body></html>"#;
    mount_article(&server, "8", body.to_string()).await;

    let resolver = DownloadResolver::new(&config)
        .unwrap()
        .with_lookup(Box::new(DataAttributeLookup));
    let candidates = resolver.extract_candidates(&article_url(&server, "8")).await;

    assert_eq!(candidates.len(), 2);
    let best = select_best(&candidates).unwrap();
    assert_eq!(best.size_mb, 3072.0);
    assert!(best.torrent_url.ends_with("file=b"));
}
