//! Crawler module for listing discovery
//!
//! This module contains the discovery side of the pipeline, including:
//! - HTTP fetching with the configured user agent and timeout
//! - Listing page parsing and pagination analysis
//! - The rate-limited crawl loop that feeds the entry store

mod fetcher;
mod listing;
mod parser;

pub use fetcher::{build_http_client, fetch_bytes, fetch_url, FetchResult};
pub use listing::{ListingScraper, ScrapeSummary, UNBOUNDED_PAGES};
pub use parser::{
    max_page_offset, parse_listing_page, total_pages_from_offset, ListingEntry, ListingMarkers,
};
