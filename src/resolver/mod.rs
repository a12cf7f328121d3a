//! Download resolver
//!
//! Turns an article page into a stored torrent file:
//! - Candidate extraction (torrent links and their advertised sizes)
//! - Best candidate selection by size
//! - Download and storage of the chosen torrent

mod annotation;
mod candidates;
mod size;

pub use annotation::{SiblingSpanLookup, SizeAnnotationLookup};
pub use candidates::{extract_candidates_from_html, select_best, Candidate};
pub use size::parse_size_mb;

use crate::config::Config;
use crate::crawler::{build_http_client, fetch_bytes, fetch_url};
use crate::{AmvError, ConfigError};
use regex::Regex;
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// File extension of stored torrents
pub const TORRENT_EXTENSION: &str = "torrent";

/// Resolves article pages to torrent files
pub struct DownloadResolver {
    client: Client,
    base_url: Url,
    download_pattern: Regex,
    lookup: Box<dyn SizeAnnotationLookup>,
    torrent_dir: PathBuf,
}

impl DownloadResolver {
    /// Creates a resolver with its own HTTP client
    pub fn new(config: &Config) -> Result<Self, AmvError> {
        let client = build_http_client(&config.http)?;
        Self::with_client(config, client)
    }

    /// Creates a resolver that shares an existing HTTP client
    pub fn with_client(config: &Config, client: Client) -> Result<Self, AmvError> {
        let download_pattern = Regex::new(&config.site.download_pattern)
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.site.base_url)?,
            download_pattern,
            lookup: Box::new(SiblingSpanLookup::new(config.site.size_class.clone())),
            torrent_dir: config.storage.torrent_dir.clone(),
        })
    }

    /// Replaces the size annotation lookup
    pub fn with_lookup(mut self, lookup: Box<dyn SizeAnnotationLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Directory torrents are written to
    pub fn torrent_dir(&self) -> &Path {
        &self.torrent_dir
    }

    /// Full path of a stored torrent reference
    pub fn torrent_path(&self, reference: &str) -> PathBuf {
        self.torrent_dir.join(reference)
    }

    /// Fetches an article page and extracts its download candidates
    ///
    /// A page that cannot be fetched gives no candidates.
    pub async fn extract_candidates(&self, article_url: &str) -> Vec<Candidate> {
        let Some(body) = fetch_url(&self.client, article_url)
            .await
            .into_body(article_url)
        else {
            return Vec::new();
        };

        let candidates = extract_candidates_from_html(
            &body,
            &self.base_url,
            &self.download_pattern,
            self.lookup.as_ref(),
        );
        tracing::debug!("{} candidates on {}", candidates.len(), article_url);
        candidates
    }

    /// Downloads a torrent and stores it as `<id>.torrent`
    ///
    /// The directory is created if needed. The bytes land in a temporary
    /// file first and are renamed into place, so a failed download never
    /// leaves a truncated torrent behind.
    ///
    /// # Returns
    ///
    /// The stored file name, relative to the torrent directory
    pub async fn fetch_and_store(&self, torrent_url: &str, id: &str) -> Result<String, AmvError> {
        let bytes = match fetch_bytes(&self.client, torrent_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Torrent download failed for {}: {}", id, e);
                return Err(e);
            }
        };

        let reference = torrent_file_name(id);
        match write_torrent(&self.torrent_dir, &reference, &bytes).await {
            Ok(path) => {
                tracing::debug!("Stored {} bytes at {}", bytes.len(), path.display());
                Ok(reference)
            }
            Err(e) => {
                tracing::warn!(
                    "Could not write torrent for {} into {}: {}",
                    id,
                    self.torrent_dir.display(),
                    e
                );
                Err(e.into())
            }
        }
    }
}

/// Writes `bytes` to `dir/reference` through a `.part` file
///
/// The directory is created first. On a failed write or rename the `.part`
/// file is removed again.
async fn write_torrent(dir: &Path, reference: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let final_path = dir.join(reference);
    let part_path = dir.join(format!("{}.part", reference));

    let written = match tokio::fs::write(&part_path, bytes).await {
        Ok(()) => tokio::fs::rename(&part_path, &final_path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&part_path).await;
        return Err(e);
    }

    Ok(final_path)
}

/// Deterministic torrent file name for an id
///
/// Characters outside `[A-Za-z0-9_-]` are replaced so a hostile id cannot
/// escape the torrent directory.
pub fn torrent_file_name(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.{}", stem, TORRENT_EXTENSION)
}
