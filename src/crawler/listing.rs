//! Listing scraper - paginated discovery of new AMVs
//!
//! Walks the news listing page by page, stores every (id, article URL) pair
//! it has not seen before, and stops at the first empty page.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url};
use crate::crawler::parser::{
    max_page_offset, parse_listing_page, total_pages_from_offset, ListingEntry, ListingMarkers,
};
use crate::links::{listing_page_url, ARTICLES_PER_PAGE};
use crate::storage::EntryStore;
use crate::AmvError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Page cap used when the page count cannot be estimated
///
/// The crawl still ends at the first empty page.
pub const UNBOUNDED_PAGES: u32 = u32::MAX / ARTICLES_PER_PAGE;

/// Outcome of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Listing pages requested
    pub pages_fetched: u32,
    /// Article entries seen across all pages
    pub entries_seen: usize,
    /// Ids that were not in the store before this crawl
    pub new_count: usize,
}

/// Crawls the paginated news listing
pub struct ListingScraper {
    client: Client,
    listing_url: String,
    base_url: Url,
    markers: ListingMarkers,
    request_delay: Duration,
}

impl ListingScraper {
    /// Creates a scraper with its own HTTP client
    pub fn new(config: &Config) -> Result<Self, AmvError> {
        let client = build_http_client(&config.http)?;
        Self::with_client(config, client)
    }

    /// Creates a scraper that shares an existing HTTP client
    pub fn with_client(config: &Config, client: Client) -> Result<Self, AmvError> {
        Ok(Self {
            client,
            listing_url: config.site.listing_url(),
            base_url: Url::parse(&config.site.base_url)?,
            markers: ListingMarkers::from_site(&config.site),
            request_delay: config.http.request_delay(),
        })
    }

    /// Fetches one listing page (1-based) and extracts its article entries
    ///
    /// Any transport or HTTP failure is logged and yields an empty list, the
    /// same as a page without articles.
    pub async fn fetch_page(&self, page: u32) -> Vec<ListingEntry> {
        let url = match listing_page_url(&self.listing_url, page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build URL for listing page {}: {}", page, e);
                return Vec::new();
            }
        };

        tracing::debug!("Fetching listing page {}: {}", page, url);

        match fetch_url(&self.client, url.as_str()).await.into_body(url.as_str()) {
            Some(body) => parse_listing_page(&body, &self.base_url, &self.markers),
            None => {
                tracing::warn!(
                    "Listing page {} could not be fetched; treating it as the end of the listing",
                    page
                );
                Vec::new()
            }
        }
    }

    /// Estimates the number of listing pages from page 1's pagination links
    ///
    /// # Returns
    ///
    /// * `Some(n)` - `max_offset / 10 + 1`, or 1 when there is no pagination
    /// * `None` - the first page could not be fetched
    pub async fn estimate_total_pages(&self) -> Option<u32> {
        let url = listing_page_url(&self.listing_url, 1).ok()?;
        let body = fetch_url(&self.client, url.as_str())
            .await
            .into_body(url.as_str())?;

        let total = total_pages_from_offset(max_page_offset(&body));
        tracing::info!("Listing has an estimated {} pages", total);
        Some(total)
    }

    /// Crawls listing pages and stores new AMVs
    ///
    /// Pages 1..=max_pages are fetched in order. When `max_pages` is None the
    /// count is estimated first, falling back to [`UNBOUNDED_PAGES`]. An
    /// empty page ends the crawl early. Each insert commits on its own, so an
    /// interrupted crawl keeps everything stored so far.
    pub async fn scrape_all(
        &self,
        store: &mut dyn EntryStore,
        max_pages: Option<u32>,
    ) -> Result<ScrapeSummary, AmvError> {
        let max_pages = match max_pages {
            Some(n) => n,
            None => match self.estimate_total_pages().await {
                Some(n) => n,
                None => {
                    tracing::warn!("Could not estimate page count, crawling until an empty page");
                    UNBOUNDED_PAGES
                }
            },
        };

        let mut summary = ScrapeSummary::default();

        for page in 1..=max_pages {
            if page > 1 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let entries = self.fetch_page(page).await;
            summary.pages_fetched += 1;

            if entries.is_empty() {
                tracing::info!("Page {} has no articles, stopping", page);
                break;
            }

            let mut page_new = 0;
            for entry in &entries {
                if store.insert_if_absent(&entry.id, &entry.article_url)? {
                    tracing::debug!("New AMV {}: {}", entry.id, entry.article_url);
                    page_new += 1;
                }
            }

            summary.entries_seen += entries.len();
            summary.new_count += page_new;

            tracing::info!(
                "Page {}/{}: {} articles, {} new",
                page,
                max_pages,
                entries.len(),
                page_new
            );
        }

        tracing::info!(
            "Crawl finished: {} pages, {} articles, {} new",
            summary.pages_fetched,
            summary.entries_seen,
            summary.new_count
        );

        Ok(summary)
    }
}
