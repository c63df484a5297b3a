//! Seniority levels assigned to postings by the classifier
//!
//! The level is derived from the posting title only; it is refreshed on every
//! sighting of a posting.

use std::fmt;

/// The seniority band a posting title falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Seniority {
    /// Entry level, junior, associate and intern roles
    Entry,

    /// No explicit level in the title
    Mid,

    /// Senior and lead individual contributors
    Senior,

    /// Staff, principal and architect roles
    Staff,

    /// People managers and executives
    Management,
}

impl Seniority {
    /// Converts the seniority to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Staff => "staff",
            Self::Management => "management",
        }
    }

    /// Parses a seniority from its database string representation
    ///
    /// Returns None if the string doesn't match any known level.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "entry" => Some(Self::Entry),
            "mid" => Some(Self::Mid),
            "senior" => Some(Self::Senior),
            "staff" => Some(Self::Staff),
            "management" => Some(Self::Management),
            _ => None,
        }
    }

    /// Returns all levels, most junior first
    pub fn all_levels() -> Vec<Self> {
        vec![
            Self::Entry,
            Self::Mid,
            Self::Senior,
            Self::Staff,
            Self::Management,
        ]
    }
}

impl Default for Seniority {
    fn default() -> Self {
        Self::Mid
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
