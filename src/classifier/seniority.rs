//! Seniority detection from free-text titles

use crate::posting::Seniority;
use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered seniority rules; the first matching rule wins
///
/// Management outranks every other signal, so "Senior Engineering Manager"
/// is management rather than senior.
static SENIORITY_RULES: Lazy<Vec<(Seniority, Regex)>> = Lazy::new(|| {
    vec![
        (
            Seniority::Management,
            Regex::new(r"(?i)\b(?:manager|director|vp|vice president|head of|chief)\b")
                .expect("Invalid regex"),
        ),
        (
            Seniority::Staff,
            Regex::new(r"(?i)\b(?:staff|principal|architect)\b").expect("Invalid regex"),
        ),
        (
            Seniority::Senior,
            Regex::new(r"(?i)\b(?:senior|sr|lead)\b").expect("Invalid regex"),
        ),
        (
            Seniority::Entry,
            Regex::new(r"(?i)\b(?:entry|junior|jr|associate|intern)\b").expect("Invalid regex"),
        ),
    ]
});

/// Detects the seniority level of a job title
///
/// Titles matching none of the rules are mid-level.
pub fn detect_seniority(text: &str) -> Seniority {
    SENIORITY_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(level, _)| *level)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(detect_seniority("Senior Engineering Manager"), Seniority::Management);
        assert_eq!(detect_seniority("Staff Software Engineer"), Seniority::Staff);
        assert_eq!(detect_seniority("Junior Developer"), Seniority::Entry);
        assert_eq!(detect_seniority("Software Engineer"), Seniority::Mid);
    }

    #[test]
    fn test_management_variants() {
        assert_eq!(detect_seniority("Director of Engineering"), Seniority::Management);
        assert_eq!(detect_seniority("VP, Data Platform"), Seniority::Management);
        assert_eq!(detect_seniority("Head of Infrastructure"), Seniority::Management);
        assert_eq!(detect_seniority("Chief Technology Officer"), Seniority::Management);
    }

    #[test]
    fn test_staff_outranks_senior() {
        assert_eq!(detect_seniority("Senior Principal Engineer"), Seniority::Staff);
        assert_eq!(detect_seniority("Lead Solutions Architect"), Seniority::Staff);
    }

    #[test]
    fn test_abbreviations() {
        assert_eq!(detect_seniority("Sr. Backend Engineer"), Seniority::Senior);
        assert_eq!(detect_seniority("Jr Data Analyst"), Seniority::Entry);
        assert_eq!(detect_seniority("Tech Lead"), Seniority::Senior);
    }

    #[test]
    fn test_whole_words_only() {
        // "Staffing", "Leadership" and "Internal" carry no seniority signal
        assert_eq!(detect_seniority("Staffing Coordinator"), Seniority::Mid);
        assert_eq!(detect_seniority("Leadership Development Analyst"), Seniority::Mid);
        assert_eq!(detect_seniority("Internal Tools Engineer"), Seniority::Mid);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(detect_seniority("SENIOR RUST ENGINEER"), Seniority::Senior);
        assert_eq!(detect_seniority("software engineering intern"), Seniority::Entry);
    }
}
