use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for AMV Harvest
///
/// Every section is optional; missing sections and keys fall back to the
/// values for amvnews.ru.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub client: ClientConfig,
    pub library: LibraryConfig,
}

/// Source site layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL used to resolve relative links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path (with query) of the first listing page, relative to the base URL
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// CSS class carried by genuine article links on listing pages
    #[serde(rename = "article-link-class")]
    pub article_link_class: String,

    /// Classes or ids of containers whose links are not articles
    #[serde(rename = "excluded-containers")]
    pub excluded_containers: Vec<String>,

    /// Regex that a torrent download href must match
    #[serde(rename = "download-pattern")]
    pub download_pattern: String,

    /// CSS class of the span holding a download's size
    #[serde(rename = "size-class")]
    pub size_class: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://amvnews.ru".to_string(),
            listing_path: "/index.php?go=News&in=cat&id=1".to_string(),
            article_link_class: "newstitle".to_string(),
            excluded_containers: vec!["featured".to_string(), "header".to_string()],
            download_pattern: r"go=Files&in=get".to_string(),
            size_class: "filesize".to_string(),
        }
    }
}

impl SiteConfig {
    /// Absolute URL of the first listing page
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.listing_path.trim_start_matches('/')
        )
    }
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Pause between successive page or download requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0"
                .to_string(),
            timeout_secs: 30,
            request_delay_ms: 1000,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Local storage locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: PathBuf,

    /// Directory that receives downloaded torrent files
    #[serde(rename = "torrent-dir")]
    pub torrent_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("amvscrape.db"),
            torrent_dir: PathBuf::from("torrent-files"),
        }
    }
}

/// External torrent client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Executable name or path
    #[serde(rename = "torrent-client")]
    pub torrent_client: String,

    /// Maximum number of torrent files handed over per invocation
    #[serde(rename = "batch-size")]
    pub batch_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            torrent_client: "deluge-gtk".to_string(),
            batch_size: 50,
        }
    }
}

/// Library directory scanning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Number of leading digits that form the id in a library file name
    #[serde(rename = "id-width")]
    pub id_width: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self { id_width: 5 }
    }
}
