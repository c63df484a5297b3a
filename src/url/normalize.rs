use crate::{UrlError, UrlResult};
use url::Url;

/// Link schemes that never point at a posting
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes an absolute posting URL into its identity key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that isn't HTTP or HTTPS, or has no host
/// 3. Remove every query parameter (listing sites hang tracking and
///    session tokens off the query string)
/// 4. Remove the fragment
///
/// Host lowercasing and dot-segment removal come from the URL parser.
///
/// # Examples
///
/// ```
/// use job_ripple::url::normalize_posting_url;
///
/// let url = normalize_posting_url("https://EXAMPLE.com/jobs/view?jk=abc#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/jobs/view");
/// ```
pub fn normalize_posting_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Resolves a scraped href against the site origin and normalizes it
///
/// Relative and absolute hrefs are both accepted. Fragment-only links and
/// `javascript:`, `mailto:`, `tel:` and `data:` links are rejected.
///
/// # Examples
///
/// ```
/// use job_ripple::url::resolve_posting_url;
/// use url::Url;
///
/// let origin = Url::parse("https://example.com").unwrap();
/// let url = resolve_posting_url("/jobs/view?id=1&jk=abc123&tk=xyz", &origin).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/jobs/view");
/// ```
pub fn resolve_posting_url(href: &str, origin: &Url) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::EmptyLink);
    }

    let lowered = href.to_ascii_lowercase();
    if let Some(scheme) = SKIPPED_SCHEMES.iter().find(|s| lowered.starts_with(**s)) {
        return Err(UrlError::InvalidScheme(scheme.trim_end_matches(':').to_string()));
    }

    let absolute = origin
        .join(href)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    normalize_posting_url(absolute.as_str())
}
