//! HTML parser for listing pages
//!
//! This module extracts from a news listing page:
//! - Article links with their AMV ids
//! - The highest pagination offset, for page-count estimation

use crate::config::SiteConfig;
use crate::links::{query_param, resolve_href, ARTICLES_PER_PAGE};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static PAGE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"page=(\d+)").expect("page offset regex is valid"));

/// One article found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Id as spelled in the article link's query string
    pub id: String,
    /// Absolute article URL
    pub article_url: String,
}

/// What distinguishes article links from the rest of a listing page
#[derive(Debug, Clone)]
pub struct ListingMarkers {
    /// Class every article link carries
    pub article_link_class: String,
    /// Ids, classes or tag names of containers whose links are skipped
    pub excluded_containers: Vec<String>,
}

impl ListingMarkers {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            article_link_class: site.article_link_class.clone(),
            excluded_containers: site.excluded_containers.clone(),
        }
    }

    fn is_article_link(&self, element: &ElementRef<'_>) -> bool {
        element
            .value()
            .classes()
            .any(|c| c == self.article_link_class.as_str())
    }

    fn is_excluded_container(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        self.excluded_containers.iter().any(|marker| {
            value.name() == marker.as_str()
                || value.id() == Some(marker.as_str())
                || value.classes().any(|c| c == marker.as_str())
        })
    }

    fn inside_excluded_container(&self, element: &ElementRef<'_>) -> bool {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.is_excluded_container(&ancestor))
    }
}

/// Extracts article entries from a listing page
///
/// # Extraction Rules
///
/// **Include:** `<a href>` elements carrying the article-link class whose
/// resolved URL has an `id` query parameter.
///
/// **Exclude:** links inside an excluded container (featured block, page
/// header), and repeated ids (the first occurrence on the page wins).
///
/// # Example
///
/// ```
/// use amv_harvest::crawler::{parse_listing_page, ListingMarkers};
/// use url::Url;
///
/// let markers = ListingMarkers {
///     article_link_class: "newstitle".to_string(),
///     excluded_containers: vec!["featured".to_string()],
/// };
/// let html = r#"<a class="newstitle" href="/index.php?go=Files&in=view&id=123">AMV</a>"#;
/// let base = Url::parse("https://amvnews.ru").unwrap();
/// let entries = parse_listing_page(html, &base, &markers);
/// assert_eq!(entries[0].id, "123");
/// ```
pub fn parse_listing_page(html: &str, base_url: &Url, markers: &ListingMarkers) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return entries;
    };

    for element in document.select(&a_selector) {
        if !markers.is_article_link(&element) || markers.inside_excluded_container(&element) {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(article_url) = resolve_href(href, base_url) else {
            tracing::debug!("Skipping unresolvable article href {}", href);
            continue;
        };

        let Some(id) = query_param(&article_url, "id") else {
            tracing::debug!("Article link without id: {}", article_url);
            continue;
        };

        if seen.insert(id.clone()) {
            entries.push(ListingEntry {
                id,
                article_url: article_url.to_string(),
            });
        }
    }

    entries
}

/// Returns the highest `page=<n>` offset among the page's links
pub fn max_page_offset(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let a_selector = Selector::parse("a[href]").ok()?;

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| PAGE_OFFSET.captures(href))
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
}

/// Converts the highest pagination offset into a page count
///
/// A listing without pagination links is a single page.
pub fn total_pages_from_offset(max_offset: Option<u32>) -> u32 {
    match max_offset {
        Some(offset) => offset / ARTICLES_PER_PAGE + 1,
        None => 1,
    }
}
