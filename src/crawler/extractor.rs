//! Listing extractor for search result pages
//!
//! The target site changes its markup without notice, so extraction tries an
//! ordered chain of known card layouts and falls back to a heading heuristic
//! when none of them match. Extraction never fails: a page that matches
//! nothing yields an empty list, and a broken card is skipped.

use crate::posting::{RawPosting, NOT_SPECIFIED};
use crate::url::resolve_posting_url;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Known card layouts, tried in order; the first with any match wins
const CARD_PATTERNS: &[(&str, &str)] = &[
    ("mosaic-card", "div.job_seen_beacon"),
    ("result-content", "td.resultContent"),
    ("job-key", "[data-jk]"),
    ("generic-card", "li.job-card, div.job-card, article.job"),
];

const HEADING_SELECTOR: &str = "h1, h2, h3, h4";
const LINK_SELECTOR: &str = "a[href]";

// Labeled-field selectors, most specific first. Substring matches come last
// because they also hit wrappers such as `div.company_location`.
const TITLE_SELECTORS: &[&str] = &[
    "h2.jobTitle",
    "[class*='jobTitle']",
    "[data-testid*='title']",
    "[class*='title'], [class*='Title']",
];
const COMPANY_SELECTORS: &[&str] = &[
    "[data-testid='company-name']",
    ".companyName",
    "[class*='company'], [class*='Company']",
];
const LOCATION_SELECTORS: &[&str] = &[
    "[data-testid='text-location']",
    ".companyLocation",
    "[class*='location'], [class*='Location']",
];

/// Headings that look like a job title
static JOB_NOUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)engineer|developer|analyst|manager|designer|scientist").expect("Invalid regex")
});

/// Remote/hybrid markers or a "City, ST" pair
static LOCATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?i:remote|hybrid)\b|\b[A-Z][a-z]+(?: [A-Z][a-z]+){0,2}, [A-Z]{2}\b")
        .expect("Invalid regex")
});

/// A region of the page believed to describe one posting
struct Candidate<'a> {
    container: ElementRef<'a>,
    /// Heading that triggered the heuristic, if any
    heading: Option<ElementRef<'a>>,
}

/// Extracts raw postings from a search result page
///
/// # Arguments
///
/// * `html` - The page markup
/// * `origin` - The site origin relative links are resolved against
///
/// # Returns
///
/// Postings in document order, deduplicated by normalized URL
///
/// # Example
///
/// ```
/// use job_ripple::crawler::extract_postings;
/// use url::Url;
///
/// let html = r#"<div class="job_seen_beacon">
///     <h2 class="jobTitle"><a href="/viewjob?jk=1">Rust Engineer</a></h2>
///     <span data-testid="company-name">Acme</span>
///     <div data-testid="text-location">Remote</div>
/// </div>"#;
/// let origin = Url::parse("https://example.com").unwrap();
///
/// let postings = extract_postings(html, &origin);
/// assert_eq!(postings.len(), 1);
/// assert_eq!(postings[0].url, "https://example.com/viewjob");
/// ```
pub fn extract_postings(html: &str, origin: &Url) -> Vec<RawPosting> {
    let document = Html::parse_document(html);

    let candidates = match card_candidates(&document) {
        Some(candidates) => candidates,
        None => {
            debug!("No known card pattern matched, falling back to heading heuristic");
            heading_candidates(&document)
        }
    };

    let mut seen_urls = HashSet::new();
    let mut postings = Vec::new();

    for candidate in candidates {
        let Some(posting) = build_posting(&candidate, origin) else {
            continue;
        };

        if seen_urls.insert(posting.url.clone()) {
            postings.push(posting);
        }
    }

    postings
}

/// Returns the matches of the first card pattern that matches anything
fn card_candidates(document: &Html) -> Option<Vec<Candidate<'_>>> {
    for (name, pattern) in CARD_PATTERNS {
        let Ok(selector) = Selector::parse(pattern) else {
            continue;
        };

        let cards: Vec<Candidate<'_>> = document
            .select(&selector)
            .map(|container| Candidate {
                container,
                heading: None,
            })
            .collect();

        if !cards.is_empty() {
            debug!("Card pattern '{}' matched {} elements", name, cards.len());
            return Some(cards);
        }
    }

    None
}

/// Finds job-like headings and the containers that hold them
fn heading_candidates(document: &Html) -> Vec<Candidate<'_>> {
    let Ok(selector) = Selector::parse(HEADING_SELECTOR) else {
        return Vec::new();
    };

    let mut seen_containers = HashSet::new();
    let mut candidates = Vec::new();

    for heading in document.select(&selector) {
        if !JOB_NOUN.is_match(&element_text(&heading)) {
            continue;
        }

        let Some(container) = enclosing_container(heading) else {
            continue;
        };

        if seen_containers.insert(container.id()) {
            candidates.push(Candidate {
                container,
                heading: Some(heading),
            });
        }
    }

    candidates
}

/// Nearest non-link ancestor that contains a link, else the parent element
fn enclosing_container(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut parent = None;

    for ancestor in heading.ancestors().filter_map(ElementRef::wrap) {
        let tag = ancestor.value().name();
        if tag == "body" || tag == "html" {
            break;
        }

        if parent.is_none() {
            parent = Some(ancestor);
        }

        if tag != "a" && first_link(&ancestor).is_some() {
            return Some(ancestor);
        }
    }

    parent
}

/// Builds a posting from a candidate; None when the title or URL is missing
fn build_posting(candidate: &Candidate<'_>, origin: &Url) -> Option<RawPosting> {
    let container = &candidate.container;

    let title = candidate
        .heading
        .map(|heading| element_text(&heading))
        .filter(|text| !text.is_empty())
        .or_else(|| labeled_text(container, TITLE_SELECTORS))
        .or_else(|| first_link(container).map(|link| element_text(&link)).filter(|t| !t.is_empty()))
        .or_else(|| text_fragments(container).into_iter().next());

    let Some(title) = title else {
        debug!("Discarding candidate without a title");
        return None;
    };

    let href = first_link(container).and_then(|link| link.value().attr("href"));
    let url = match href.map(|href| resolve_posting_url(href, origin)) {
        Some(Ok(url)) => url,
        Some(Err(e)) => {
            debug!("Discarding '{}': unusable link ({})", title, e);
            return None;
        }
        None => {
            debug!("Discarding '{}': no link", title);
            return None;
        }
    };

    let company = labeled_text(container, COMPANY_SELECTORS).unwrap_or_else(|| NOT_SPECIFIED.to_string());

    let location = labeled_text(container, LOCATION_SELECTORS)
        .or_else(|| find_location(container, &title))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    Some(RawPosting {
        title,
        company,
        location,
        url: url.to_string(),
    })
}

/// The container itself when it is a link, else its first descendant link
fn first_link<'a>(container: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    if container.value().name() == "a" && container.value().attr("href").is_some() {
        return Some(*container);
    }

    let selector = Selector::parse(LINK_SELECTOR).ok()?;
    container.select(&selector).next()
}

/// Text of the first labeled descendant, trying `selectors` in order
///
/// Within one selector, an element that contains another match of the same
/// selector is skipped so the innermost label wins.
fn labeled_text(container: &ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|selector| Selector::parse(selector).ok())
        .find_map(|selector| {
            let matches: Vec<ElementRef<'_>> = container
                .select(&selector)
                .filter(|element| element.id() != container.id())
                .collect();
            let ids: HashSet<_> = matches.iter().map(|element| element.id()).collect();

            matches
                .iter()
                .filter(|element| {
                    !element
                        .descendants()
                        .skip(1)
                        .any(|node| ids.contains(&node.id()))
                })
                .map(element_text)
                .find(|text| !text.is_empty())
        })
}

/// Matches the location pattern against each text fragment except the title
fn find_location(container: &ElementRef<'_>, title: &str) -> Option<String> {
    text_fragments(container)
        .into_iter()
        .filter(|fragment| fragment != title)
        .find_map(|fragment| {
            LOCATION_PATTERN
                .find(&fragment)
                .map(|m| m.as_str().to_string())
        })
}

/// Non-empty, whitespace-collapsed text nodes in document order
fn text_fragments(element: &ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(collapse_whitespace)
        .filter(|text| !text.is_empty())
        .collect()
}

fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    const MOSAIC_PAGE: &str = r#"
        <html><body>
        <div id="mosaic-provider-jobcards">
          <div class="job_seen_beacon">
            <h2 class="jobTitle"><a class="jcs-JobTitle" href="/viewjob/abc123?from=serp&amp;vjs=3">
              <span title="Senior Rust Engineer">Senior Rust Engineer</span></a></h2>
            <span data-testid="company-name">Acme Corp</span>
            <div data-testid="text-location">Austin, TX 78701</div>
          </div>
          <div class="job_seen_beacon">
            <h2 class="jobTitle"><a class="jcs-JobTitle" href="/viewjob/def456">
              <span>Data Analyst</span></a></h2>
            <span data-testid="company-name">Globex</span>
            <div data-testid="text-location">Remote</div>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_mosaic_cards() {
        let postings = extract_postings(MOSAIC_PAGE, &origin());

        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title, "Senior Rust Engineer");
        assert_eq!(postings[0].company, "Acme Corp");
        assert_eq!(postings[0].location, "Austin, TX 78701");
        assert_eq!(postings[0].url, "https://example.com/viewjob/abc123");
        assert_eq!(postings[1].url, "https://example.com/viewjob/def456");
        assert_eq!(postings[1].title, "Data Analyst");
        assert_eq!(postings[1].location, "Remote");
    }

    #[test]
    fn test_labeled_children_beat_wrapper() {
        let html = r#"
            <div class="job_seen_beacon">
              <h2 class="jobTitle"><a href="/viewjob/xyz">Backend Engineer</a></h2>
              <div class="company_location">
                <span data-testid="company-name">Acme Corp</span>
                <div data-testid="text-location">Austin, TX</div>
              </div>
            </div>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].company, "Acme Corp");
        assert_eq!(postings[0].location, "Austin, TX");
    }

    #[test]
    fn test_innermost_substring_label_wins() {
        let html = r#"
            <li class="job-card"><a href="/p/1">Site Reliability Engineer</a>
              <div class="job-company-block">Hiring: <span class="company-name-text">Umbrella</span></div>
            </li>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].company, "Umbrella");
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        // Both a mosaic card and a job-card exist; only the mosaic card is used
        let html = r#"
            <div class="job_seen_beacon"><a href="/jobs/1" class="jobTitle">Backend Developer</a></div>
            <li class="job-card"><a href="/jobs/2">Frontend Developer</a></li>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Backend Developer");
    }

    #[test]
    fn test_result_content_cells() {
        let html = r#"
            <table><tr>
              <td class="resultContent">
                <h2 class="jobTitle"><a href="/viewjob?jk=1">Platform Engineer</a></h2>
                <span class="companyName">Initech</span>
                <div class="companyLocation">Hybrid remote in Denver, CO</div>
              </td>
            </tr></table>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].company, "Initech");
        assert_eq!(postings[0].location, "Hybrid remote in Denver, CO");
    }

    #[test]
    fn test_job_key_cards() {
        let html = r#"
            <div data-jk="a1"><a href="/viewjob?jk=a1">ML Engineer</a><p>Boston, MA</p></div>
            <div data-jk="b2"><a href="/viewjob2?jk=b2">QA Analyst</a></div>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title, "ML Engineer");
        assert_eq!(postings[0].location, "Boston, MA");
        assert_eq!(postings[0].company, NOT_SPECIFIED);
        assert_eq!(postings[1].location, NOT_SPECIFIED);
    }

    #[test]
    fn test_generic_cards() {
        let html = r#"
            <ul>
              <li class="job-card"><a href="https://example.com/p/7#apply">Product Designer</a>
                <span class="job-company">Hooli</span></li>
            </ul>
            <article class="job"><a href="/p/8">Research Scientist</a></article>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].url, "https://example.com/p/7");
        assert_eq!(postings[0].company, "Hooli");
        assert_eq!(postings[1].title, "Research Scientist");
    }

    #[test]
    fn test_heading_fallback() {
        let html = r#"
            <html><body>
              <nav><a href="/home">Home</a></nav>
              <section>
                <div class="listing">
                  <h3>Senior Data Engineer</h3>
                  <p>Remote</p>
                  <a href="/postings/42?ref=home">Apply</a>
                </div>
              </section>
            </body></html>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Senior Data Engineer");
        assert_eq!(postings[0].url, "https://example.com/postings/42");
        assert_eq!(postings[0].location, "Remote");
        assert_eq!(postings[0].company, NOT_SPECIFIED);
    }

    #[test]
    fn test_heading_inside_link() {
        let html = r#"
            <div class="row">
              <a href="/jobs/99"><h4>Software Developer</h4></a>
            </div>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].url, "https://example.com/jobs/99");
    }

    #[test]
    fn test_heading_fallback_ignores_non_job_headings() {
        let html = r#"
            <div><h2>About us</h2><a href="/about">More</a></div>
            <div><h2>Contact</h2><a href="/contact">Write</a></div>
        "#;

        assert!(extract_postings(html, &origin()).is_empty());
    }

    #[test]
    fn test_shared_container_collapsed() {
        let html = r#"
            <div class="box">
              <h2>Engineering Manager</h2>
              <h3>Reports to the Director, Engineering</h3>
              <a href="/jobs/5">Details</a>
            </div>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Engineering Manager");
    }

    #[test]
    fn test_candidates_without_link_are_discarded() {
        let html = r#"
            <li class="job-card"><span class="title">No Link Engineer</span></li>
            <li class="job-card"><a href="javascript:void(0)">Script Engineer</a></li>
            <li class="job-card"><a href="/jobs/3">Real Engineer</a></li>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Real Engineer");
    }

    #[test]
    fn test_duplicate_urls_within_page() {
        let html = r#"
            <li class="job-card"><a href="/jobs/1?src=a">Rust Engineer</a></li>
            <li class="job-card"><a href="/jobs/1?src=b">Rust Engineer (featured)</a></li>
        "#;

        let postings = extract_postings(html, &origin());

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Rust Engineer");
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let html = "<div class='job-card'><a href='/x'>Broken <b>Engineer</div></li></table>";
        let postings = extract_postings(html, &origin());
        assert!(postings.len() <= 1);

        assert!(extract_postings("", &origin()).is_empty());
        assert!(extract_postings("not html at all", &origin()).is_empty());
    }
}
