//! Link handling helpers
//!
//! Resolving hrefs against the site base, building paginated listing URLs,
//! and reading ids out of query strings.

use url::Url;

/// Query parameter that carries the listing offset
pub const PAGE_PARAM: &str = "page";

/// Number of articles per listing page; the offset grows by this much
pub const ARTICLES_PER_PAGE: u32 = 10;

/// Builds the URL of a 1-based listing page
///
/// Page 1 is the bare listing URL. Page N > 1 appends
/// `page=(N-1)*10` to the existing query.
///
/// # Example
///
/// ```
/// use amv_harvest::links::listing_page_url;
///
/// let url = listing_page_url("https://amvnews.ru/index.php?go=News&in=cat&id=1", 3).unwrap();
/// assert_eq!(url.as_str(), "https://amvnews.ru/index.php?go=News&in=cat&id=1&page=20");
/// ```
pub fn listing_page_url(listing_url: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(listing_url)?;
    if page > 1 {
        let offset = (page - 1) * ARTICLES_PER_PAGE;
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &offset.to_string());
    }
    Ok(url)
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link should be ignored:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: schemes
/// - hrefs that do not resolve to http or https
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Returns the first value of a query parameter
pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Returns the `id` query parameter of an absolute URL string
pub fn id_from_url(url: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| query_param(&u, "id"))
}
