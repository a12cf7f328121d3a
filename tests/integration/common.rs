//! Shared fixtures for integration tests

use amv_harvest::config::Config;
use std::path::Path;

pub const LISTING_PATH: &str = "/index.php";

/// Creates a test configuration pointing at a mock server
///
/// Request delay is zero and all files live under `dir`.
pub fn test_config(server_uri: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = server_uri.to_string();
    config.http.request_delay_ms = 0;
    config.http.timeout_secs = 5;
    config.storage.database_path = dir.join("amvs.db");
    config.storage.torrent_dir = dir.join("torrent-files");
    config
}

/// Listing page with one article link per id
pub fn listing_html(ids: &[&str], max_offset: Option<u32>) -> String {
    let mut body = String::from(
        r#"<html><body>
        <div id="header"><a class="newstitle" href="/index.php?go=Files&in=view&id=1">Site news</a></div>
        <div class="featured"><a class="newstitle" href="/index.php?go=Files&in=view&id=2">Featured</a></div>
        <div class="news">"#,
    );
    for id in ids {
        body.push_str(&format!(
            r#"<h2><a class="newstitle" href="/index.php?go=Files&in=view&id={id}">AMV {id}</a></h2>
            <p><a href="/index.php?go=Files&in=view&id={id}">read more</a></p>"#
        ));
    }
    body.push_str("</div>");
    if let Some(offset) = max_offset {
        for page in (10..=offset).step_by(10) {
            body.push_str(&format!(
                r#"<a href="/index.php?go=News&in=cat&id=1&page={page}">{}</a>"#,
                page / 10 + 1
            ));
        }
    }
    body.push_str("</body></html>");
    body
}

/// Article page offering one torrent per (file, size) pair
pub fn article_html(id: &str, downloads: &[(&str, &str)]) -> String {
    let mut body = format!("<html><body><h1>AMV {id}</h1><div class=\"downloads\">");
    for (file, size) in downloads {
        body.push_str(&format!(
            r#"<p><a href="/index.php?go=Files&in=get&id={id}&file={file}">Download torrent</a>
               <span class="filesize">{size}</span></p>"#
        ));
    }
    body.push_str("</div></body></html>");
    body
}

/// Matches requests for the first listing page (no `page` offset)
pub struct FirstListingPage;

impl wiremock::Match for FirstListingPage {
    fn matches(&self, request: &wiremock::Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "page")
    }
}
