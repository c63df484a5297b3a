//! Keyword and seniority classification
//!
//! Pure text-to-tags functions. The only state is the keyword dictionary,
//! which is built once at startup and shared read-only afterwards.

mod dictionary;
mod seniority;

pub use dictionary::KeywordDictionary;
pub use seniority::detect_seniority;

use crate::config::KeywordEntry;
use crate::posting::{ClassifiedPosting, RawPosting, Seniority};
use std::collections::BTreeSet;

/// Tags postings with technology keywords and a seniority level
#[derive(Debug, Clone)]
pub struct Classifier {
    dictionary: KeywordDictionary,
}

impl Classifier {
    /// Creates a classifier over the given dictionary
    pub fn new(dictionary: KeywordDictionary) -> Self {
        Self { dictionary }
    }

    /// Creates a classifier over the built-in dictionary plus configured entries
    pub fn with_entries(extra: &[KeywordEntry]) -> Result<Self, regex::Error> {
        Ok(Self::new(KeywordDictionary::with_entries(extra)?))
    }

    /// Returns the canonical technology keywords mentioned in `text`
    pub fn extract_keywords(&self, text: &str) -> BTreeSet<String> {
        self.dictionary.matches(text)
    }

    /// Returns the seniority level implied by `text`
    pub fn detect_seniority(&self, text: &str) -> Seniority {
        detect_seniority(text)
    }

    /// Classifies a raw posting by its title
    pub fn classify(&self, raw: RawPosting) -> ClassifiedPosting {
        let keywords = self.extract_keywords(&raw.title);
        let seniority = self.detect_seniority(&raw.title);
        ClassifiedPosting::from_raw(raw, keywords, seniority)
    }
}
