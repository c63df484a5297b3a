//! Posting data model
//!
//! A posting moves through three shapes on its way into the repository:
//!
//! - `RawPosting`: what the extractor scraped off a search page
//! - `ClassifiedPosting`: the raw posting plus keyword and seniority tags
//! - `StoredPosting`: a repository row with identity and lifecycle fields
//!
//! `SearchSpec` describes which searches a single crawl runs.

mod seniority;

pub use seniority::Seniority;

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Placeholder stored when a company or location could not be extracted
pub const NOT_SPECIFIED: &str = "Not specified";

/// The searches one crawl invocation runs
///
/// Every keyword is searched in every location, `max_pages` pages deep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub keywords: Vec<String>,
    pub locations: Vec<String>,
    pub max_pages: u32,
}

impl SearchSpec {
    pub fn new(keywords: Vec<String>, locations: Vec<String>, max_pages: u32) -> Self {
        Self {
            keywords,
            locations,
            max_pages,
        }
    }

    /// Number of (keyword, location) pairs this spec expands to
    pub fn pair_count(&self) -> usize {
        self.keywords.len() * self.locations.len()
    }

    /// Upper bound on the number of search pages fetched
    pub fn max_requests(&self) -> usize {
        self.pair_count() * self.max_pages as usize
    }
}

/// A posting as scraped from a search results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Absolute URL with query and fragment stripped
    pub url: String,
}

/// A raw posting tagged by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub keywords: BTreeSet<String>,
    pub seniority: Seniority,
}

impl ClassifiedPosting {
    /// Attaches classification tags to a raw posting
    pub fn from_raw(raw: RawPosting, keywords: BTreeSet<String>, seniority: Seniority) -> Self {
        Self {
            title: raw.title,
            company: raw.company,
            location: raw.location,
            url: raw.url,
            keywords,
            seniority,
        }
    }
}

/// A posting row in the repository
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPosting {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub keywords: BTreeSet<String>,
    pub seniority: Seniority,
    /// Site name the posting was first seen on
    pub source: String,
    pub is_active: bool,
    pub last_verified_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_spec_counts() {
        let spec = SearchSpec::new(
            vec!["rust".to_string(), "go".to_string()],
            vec![
                "Remote".to_string(),
                "Austin, TX".to_string(),
                "Berlin".to_string(),
            ],
            3,
        );

        assert_eq!(spec.pair_count(), 6);
        assert_eq!(spec.max_requests(), 18);
    }

    #[test]
    fn test_from_raw_keeps_scraped_fields() {
        let raw = RawPosting {
            title: "Rust Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            url: "https://example.com/jobs/1".to_string(),
        };
        let keywords: BTreeSet<String> = ["rust".to_string()].into_iter().collect();

        let classified = ClassifiedPosting::from_raw(raw, keywords, Seniority::Mid);

        assert_eq!(classified.title, "Rust Engineer");
        assert_eq!(classified.company, "Acme");
        assert_eq!(classified.url, "https://example.com/jobs/1");
        assert!(classified.keywords.contains("rust"));
        assert_eq!(classified.seniority, Seniority::Mid);
    }
}
