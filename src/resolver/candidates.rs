//! Download candidate extraction and selection

use crate::links::resolve_href;
use crate::resolver::annotation::SizeAnnotationLookup;
use crate::resolver::size::parse_size_mb;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// A downloadable torrent offered on an article page
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Absolute torrent URL
    pub torrent_url: String,
    /// Size of the offered video in MB, 0.0 when unknown
    pub size_mb: f64,
}

impl Candidate {
    pub fn new(torrent_url: impl Into<String>, size_mb: f64) -> Self {
        Self {
            torrent_url: torrent_url.into(),
            size_mb,
        }
    }
}

/// Extracts torrent download candidates from an article page
///
/// A link qualifies when its visible text contains "torrent" (any case) and
/// its href matches `download_pattern`. A candidate whose size cannot be
/// found or parsed is kept with size 0.0.
pub fn extract_candidates_from_html(
    html: &str,
    base_url: &Url,
    download_pattern: &Regex,
    lookup: &dyn SizeAnnotationLookup,
) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return candidates;
    };

    for element in document.select(&a_selector) {
        let text = element.text().collect::<String>();
        if !text.to_lowercase().contains("torrent") {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !download_pattern.is_match(href) {
            continue;
        }

        let Some(torrent_url) = resolve_href(href, base_url) else {
            tracing::debug!("Skipping unresolvable download href {}", href);
            continue;
        };

        let size_mb = match lookup.size_text(&element) {
            Some(size_text) => parse_size_mb(&size_text),
            None => {
                tracing::debug!("No size found for {}", torrent_url);
                0.0
            }
        };

        candidates.push(Candidate {
            torrent_url: torrent_url.to_string(),
            size_mb,
        });
    }

    candidates
}

/// Picks the candidate with the largest size
///
/// Larger files are taken to be the higher quality encode. On a tie the
/// earliest candidate wins; an empty slice gives None.
///
/// # Example
///
/// ```
/// use amv_harvest::resolver::{select_best, Candidate};
///
/// let candidates = vec![
///     Candidate::new("a", 10.0),
///     Candidate::new("b", 99.5),
///     Candidate::new("c", 99.5),
/// ];
/// assert_eq!(select_best(&candidates).unwrap().torrent_url, "b");
/// ```
pub fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best: Option<&Candidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.size_mb <= current.size_mb => {}
            _ => best = Some(candidate),
        }
    }
    best
}
