//! URL handling module for Job-Ripple
//!
//! This module builds paginated search URLs for the target site and turns
//! scraped posting links into normalized identity keys.

mod normalize;

use crate::config::SiteConfig;
use crate::{UrlError, UrlResult};
use url::Url;

pub use normalize::{normalize_posting_url, resolve_posting_url};

/// Number of postings the target site shows per search page
///
/// The offset parameter of page `n` is `n * PAGE_SIZE`.
pub const PAGE_SIZE: u32 = 10;

/// Parses the configured site origin
///
/// # Examples
///
/// ```
/// use job_ripple::url::parse_origin;
///
/// let origin = parse_origin("https://www.example.com").unwrap();
/// assert_eq!(origin.host_str(), Some("www.example.com"));
/// ```
pub fn parse_origin(origin: &str) -> UrlResult<Url> {
    let url = Url::parse(origin).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Builds the search URL for one page of a (keyword, location) search
///
/// # Arguments
///
/// * `site` - The target site configuration
/// * `keyword` - The search keyword
/// * `location` - The search location
/// * `page_index` - Zero-based page index
///
/// # Returns
///
/// The absolute search URL with keyword, location and offset query parameters
pub fn build_search_url(
    site: &SiteConfig,
    keyword: &str,
    location: &str,
    page_index: u32,
) -> UrlResult<Url> {
    let origin = parse_origin(&site.origin)?;
    let mut url = origin
        .join(&site.search_path)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    let offset = page_index * PAGE_SIZE;
    url.query_pairs_mut()
        .clear()
        .append_pair(&site.keyword_param, keyword)
        .append_pair(&site.location_param, location)
        .append_pair(&site.offset_param, &offset.to_string());

    Ok(url)
}
